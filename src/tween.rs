//! Time-bounded interpolation of scalar properties.
//!
//! [`Tweens`] drives any number of tweens over a target implementing
//! [`Animatable`]. Properties are addressed by a small key type `P` (an enum in
//! practice), so the engine never holds references into the scene.
//!
//! Two rules shape how tweens combine:
//!
//! - Adding a tween for a property kills the tween already running on it.
//!   An absolute target simply replaces the old one. A relative target is
//!   added onto the killed tween's destination, so quick successive nudges
//!   add up instead of being lost.
//! - Timelines place tweens one after another, or aligned with the start of
//!   the previous one ([`Position::WithPrevious`]).

use std::fmt::Debug;

use serde::Deserialize;

/// Read/write access to the animated properties of a target.
///
/// `value` returns `None` when the property is currently not bound; tweens on
/// such properties are dropped without effect.
pub trait Animatable<P> {
    fn value(&self, property: P) -> Option<f32>;
    fn set_value(&mut self, property: P, value: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    /// Animate to an absolute value.
    To(f32),
    /// Animate by an offset, resolved against the value when the tween starts.
    By(f32),
}

/// Where a timeline entry starts relative to the entry before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    AfterPrevious,
    WithPrevious,
}

#[derive(Debug, Clone)]
struct Tween<P> {
    property: P,
    value: TweenValue,
    delay: f32,
    duration: f32,
    ease: Ease,
    elapsed: f32,
    from: Option<f32>,
    to: Option<f32>,
}

impl<P> Tween<P> {
    fn destination(&self) -> Option<f32> {
        self.to.or(match self.value {
            TweenValue::To(value) => Some(value),
            TweenValue::By(_) => None,
        })
    }
}

#[derive(Debug)]
pub struct Tweens<P> {
    active: Vec<Tween<P>>,
    duration: f32,
    ease: Ease,
}

impl<P: Copy + PartialEq + Debug> Tweens<P> {
    pub fn new(duration: f32) -> Self {
        Self {
            active: Vec::new(),
            duration,
            ease: Ease::default(),
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Starts a single tween right away with the default duration and ease.
    pub fn to(&mut self, property: P, value: TweenValue) {
        let tween = self.tween(property, value, 0.0);
        self.push(tween);
    }

    pub fn timeline(&mut self) -> Timeline<'_, P> {
        Timeline {
            tweens: self,
            pending: Vec::new(),
            cursor: 0.0,
            last_start: 0.0,
        }
    }

    /// Advances every tween by `dt` seconds and writes the results to `target`.
    pub fn update<T: Animatable<P>>(&mut self, dt: f32, target: &mut T) {
        self.active.retain_mut(|tween| {
            tween.elapsed += dt;
            if tween.elapsed < tween.delay {
                return true;
            }
            let (from, to) = match (tween.from, tween.to) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    let Some(from) = target.value(tween.property) else {
                        log::debug!("Dropping tween on unbound {:?}", tween.property);
                        return false;
                    };
                    let to = match tween.value {
                        TweenValue::To(value) => value,
                        TweenValue::By(offset) => from + offset,
                    };
                    tween.from = Some(from);
                    tween.to = Some(to);
                    (from, to)
                }
            };
            let progress = if tween.duration > 0.0 {
                (tween.elapsed - tween.delay) / tween.duration
            } else {
                1.0
            };
            if progress >= 1.0 {
                target.set_value(tween.property, to);
                return false;
            }
            target.set_value(tween.property, from + (to - from) * tween.ease.apply(progress));
            true
        });
    }

    /// Destination of the tween running on `property`, if it is known yet.
    pub fn target(&self, property: P) -> Option<f32> {
        self.active
            .iter()
            .find(|tween| tween.property == property)
            .and_then(Tween::destination)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn tween(&self, property: P, value: TweenValue, delay: f32) -> Tween<P> {
        Tween {
            property,
            value,
            delay,
            duration: self.duration,
            ease: self.ease,
            elapsed: 0.0,
            from: None,
            to: None,
        }
    }

    fn push(&mut self, mut tween: Tween<P>) {
        if let Some(index) = self.active.iter().position(|t| t.property == tween.property) {
            let killed = self.active.remove(index);
            if let TweenValue::By(offset) = tween.value {
                tween.value = match (killed.to, killed.value) {
                    (Some(to), _) | (None, TweenValue::To(to)) => TweenValue::To(to + offset),
                    (None, TweenValue::By(previous)) => TweenValue::By(previous + offset),
                };
            }
        }
        self.active.push(tween);
    }
}

/// A group of tweens laid out in time, started together by [`Timeline::play`].
pub struct Timeline<'a, P: Copy + PartialEq + Debug> {
    tweens: &'a mut Tweens<P>,
    pending: Vec<Tween<P>>,
    cursor: f32,
    last_start: f32,
}

impl<P: Copy + PartialEq + Debug> Timeline<'_, P> {
    pub fn to(self, property: P, value: TweenValue) -> Self {
        self.to_at(property, value, Position::AfterPrevious)
    }

    pub fn to_at(mut self, property: P, value: TweenValue, position: Position) -> Self {
        let start = match position {
            Position::AfterPrevious => self.cursor,
            Position::WithPrevious => self.last_start,
        };
        let tween = self.tweens.tween(property, value, start);
        self.cursor = self.cursor.max(start + tween.duration);
        self.last_start = start;
        self.pending.push(tween);
        self
    }

    /// Total length of the timeline so far.
    pub fn duration(&self) -> f32 {
        self.cursor
    }

    pub fn play(self) {
        for tween in self.pending {
            self.tweens.push(tween);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Prop {
        A,
        B,
        Missing,
    }

    #[derive(Default)]
    struct Target {
        a: f32,
        b: f32,
    }

    impl Animatable<Prop> for Target {
        fn value(&self, property: Prop) -> Option<f32> {
            match property {
                Prop::A => Some(self.a),
                Prop::B => Some(self.b),
                Prop::Missing => None,
            }
        }

        fn set_value(&mut self, property: Prop, value: f32) {
            match property {
                Prop::A => self.a = value,
                Prop::B => self.b = value,
                Prop::Missing => {}
            }
        }
    }

    #[test]
    fn should_ease_out_and_land_exactly_on_target() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        tweens.to(Prop::A, TweenValue::To(1.0));

        tweens.update(0.25, &mut target);
        assert!((target.a - 0.75).abs() < 1e-6, "power1.out at half time is 0.75");

        tweens.update(0.3, &mut target);
        assert_eq!(target.a, 1.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn should_follow_configured_ease() {
        let mut tweens = Tweens::new(0.5).with_ease(Ease::Linear);
        let mut target = Target::default();
        tweens.to(Prop::A, TweenValue::To(1.0));

        tweens.update(0.25, &mut target);
        assert!((target.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn should_start_aligned_entries_together() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        tweens
            .timeline()
            .to(Prop::A, TweenValue::To(1.0))
            .to_at(Prop::B, TweenValue::To(-1.0), Position::WithPrevious)
            .play();

        tweens.update(0.25, &mut target);
        assert_eq!(target.a, -target.b);
        tweens.update(0.25, &mut target);
        assert_eq!((target.a, target.b), (1.0, -1.0));
    }

    #[test]
    fn should_run_sequenced_entries_one_after_another() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        let timeline = tweens
            .timeline()
            .to(Prop::A, TweenValue::To(1.0))
            .to(Prop::B, TweenValue::To(1.0));
        assert_eq!(timeline.duration(), 1.0);
        timeline.play();

        tweens.update(0.5, &mut target);
        assert_eq!((target.a, target.b), (1.0, 0.0));
        tweens.update(0.5, &mut target);
        assert_eq!(target.b, 1.0);
    }

    #[test]
    fn should_replace_absolute_target_on_same_property() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        tweens.to(Prop::A, TweenValue::To(1.0));
        tweens.update(0.1, &mut target);
        tweens.to(Prop::A, TweenValue::To(0.0));

        assert_eq!(tweens.len(), 1);
        assert_eq!(tweens.target(Prop::A), Some(0.0));
        tweens.update(1.0, &mut target);
        assert_eq!(target.a, 0.0);
    }

    #[test]
    fn should_accumulate_relative_moves_onto_in_flight_target() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        tweens.to(Prop::A, TweenValue::By(0.8));
        tweens.update(0.1, &mut target);
        tweens.to(Prop::A, TweenValue::By(0.8));
        // Not started yet, so both offsets are still pending.
        tweens.to(Prop::B, TweenValue::By(1.0));
        tweens.to(Prop::B, TweenValue::By(1.0));

        assert_eq!(tweens.target(Prop::A), Some(1.6));
        tweens.update(1.0, &mut target);
        assert!((target.a - 1.6).abs() < 1e-6);
        assert!((target.b - 2.0).abs() < 1e-6);
    }

    #[test]
    fn should_drop_tweens_on_unbound_properties() {
        let mut tweens = Tweens::new(0.5);
        let mut target = Target::default();
        tweens.to(Prop::Missing, TweenValue::To(1.0));
        tweens.update(0.1, &mut target);
        assert!(tweens.is_empty());
    }
}
