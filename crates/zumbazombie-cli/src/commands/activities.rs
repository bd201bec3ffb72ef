use zumbazombie_core::{Catalog, Config, TimerSetting};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::standard();
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.activities())?);
        return Ok(());
    }
    for activity in catalog.activities() {
        println!("{:>3}  {}", activity.points, activity.description);
    }
    Ok(())
}

pub fn timers() -> Result<(), Box<dyn std::error::Error>> {
    let current = Config::load()?.timer_setting();
    for setting in TimerSetting::all() {
        let marker = if setting == current { "*" } else { " " };
        println!("{marker} {}", setting.label());
    }
    Ok(())
}
