use lantern::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Config::load_or_default("settings.json");
    lantern::app::run(settings)
}
