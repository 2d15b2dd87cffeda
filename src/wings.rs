//! The four S-foil wings and the actuator that opens and closes them.

use std::fmt::Debug;

use crate::{
    config::WingNodes,
    tween::{Animatable, Position, TweenValue, Tweens},
};

/// Float slack when sampling whether the wings are open.
const OPEN_TOLERANCE: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WingId {
    FrontRight,
    BackRight,
    FrontLeft,
    BackLeft,
}

impl WingId {
    /// Actuation order; also the order of [`WingSet::targets`].
    pub const ALL: [WingId; 4] = [
        WingId::FrontRight,
        WingId::BackRight,
        WingId::FrontLeft,
        WingId::BackLeft,
    ];

    /// Front wings swing up, back wings swing down by the same amount.
    pub fn sign(self) -> f32 {
        match self {
            WingId::FrontRight | WingId::FrontLeft => 1.0,
            WingId::BackRight | WingId::BackLeft => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wing {
    /// Child index below the model root.
    pub node: usize,
    pub rotation_y: f32,
}

impl Wing {
    fn new(node: usize) -> Self {
        Self {
            node,
            rotation_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WingSet {
    pub front_left: Wing,
    pub back_left: Wing,
    pub front_right: Wing,
    pub back_right: Wing,
}

impl WingSet {
    pub fn new(nodes: WingNodes) -> Self {
        Self {
            front_left: Wing::new(nodes.front_left),
            back_left: Wing::new(nodes.back_left),
            front_right: Wing::new(nodes.front_right),
            back_right: Wing::new(nodes.back_right),
        }
    }

    pub fn wing(&self, id: WingId) -> &Wing {
        match id {
            WingId::FrontRight => &self.front_right,
            WingId::BackRight => &self.back_right,
            WingId::FrontLeft => &self.front_left,
            WingId::BackLeft => &self.back_left,
        }
    }

    pub fn wing_mut(&mut self, id: WingId) -> &mut Wing {
        match id {
            WingId::FrontRight => &mut self.front_right,
            WingId::BackRight => &mut self.back_right,
            WingId::FrontLeft => &mut self.front_left,
            WingId::BackLeft => &mut self.back_left,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WingId, &Wing)> {
        WingId::ALL.into_iter().map(|id| (id, self.wing(id)))
    }

    /// Highest child index referenced by the set.
    pub fn max_node(&self) -> usize {
        self.iter().map(|(_, wing)| wing.node).max().unwrap_or(0)
    }

    /// Where each wing will settle: the running tween's destination, or the
    /// current rotation when the wing is idle. Ordered as [`WingId::ALL`].
    pub fn targets<P>(&self, tweens: &Tweens<P>) -> [f32; 4]
    where
        P: From<WingId> + Copy + PartialEq + Debug,
    {
        WingId::ALL.map(|id| {
            tweens
                .target(P::from(id))
                .unwrap_or(self.wing(id).rotation_y)
        })
    }
}

impl Animatable<WingId> for WingSet {
    fn value(&self, property: WingId) -> Option<f32> {
        Some(self.wing(property).rotation_y)
    }

    fn set_value(&mut self, property: WingId, value: f32) {
        self.wing_mut(property).rotation_y = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WingState {
    Closed,
    Open,
}

impl WingState {
    pub fn from_rotation(front_right: f32, open_angle: f32) -> Self {
        if front_right >= open_angle - OPEN_TOLERANCE {
            WingState::Open
        } else {
            WingState::Closed
        }
    }
}

/// Plays the open and close timelines on a [`WingSet`].
///
/// All four wings start at the same instant. Calling `open` or `close` while a
/// transition is running re-targets it; the targets are absolute, so repeated
/// calls never stack.
#[derive(Debug, Clone, Copy)]
pub struct WingActuator {
    open_angle: f32,
}

impl WingActuator {
    pub fn new(open_angle: f32) -> Self {
        Self { open_angle }
    }

    pub fn open_angle(&self) -> f32 {
        self.open_angle
    }

    pub fn open<P>(&self, tweens: &mut Tweens<P>)
    where
        P: From<WingId> + Copy + PartialEq + Debug,
    {
        self.actuate(tweens, self.open_angle);
    }

    pub fn close<P>(&self, tweens: &mut Tweens<P>)
    where
        P: From<WingId> + Copy + PartialEq + Debug,
    {
        self.actuate(tweens, 0.0);
    }

    /// Samples the front right wing.
    pub fn state(&self, wings: &WingSet) -> WingState {
        WingState::from_rotation(wings.front_right.rotation_y, self.open_angle)
    }

    /// Closes open wings and opens closed ones. Returns the state being moved to.
    pub fn toggle<P>(&self, wings: &WingSet, tweens: &mut Tweens<P>) -> WingState
    where
        P: From<WingId> + Copy + PartialEq + Debug,
    {
        match self.state(wings) {
            WingState::Open => {
                self.close(tweens);
                WingState::Closed
            }
            WingState::Closed => {
                self.open(tweens);
                WingState::Open
            }
        }
    }

    fn actuate<P>(&self, tweens: &mut Tweens<P>, angle: f32)
    where
        P: From<WingId> + Copy + PartialEq + Debug,
    {
        let timeline = WingId::ALL
            .into_iter()
            .enumerate()
            .fold(tweens.timeline(), |timeline, (i, id)| {
                let position = if i == 0 {
                    Position::AfterPrevious
                } else {
                    Position::WithPrevious
                };
                timeline.to_at(P::from(id), TweenValue::To(id.sign() * angle), position)
            });
        timeline.play();
    }
}
