fn main() -> anyhow::Result<()> {
    xwing_flow::run()
}
