fn main() -> anyhow::Result<()> {
    cake_scene::run()
}
