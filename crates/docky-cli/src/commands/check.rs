use super::{drift_line, json_pretty, EXIT_SUCCESS};
use docky_core::Reconciler;
use docky_runtime::ContainerEngine;
use docky_schema::Config;

pub fn run(
    config: &Config,
    engine: &dyn ContainerEngine,
    names: &[String],
    json: bool,
) -> Result<u8, String> {
    let reports = Reconciler::new(config, engine)
        .check(names)
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&reports)?);
    } else {
        for line in reports.iter().flat_map(docky_core::DriftReport::lines) {
            println!("{}", drift_line(&line));
        }
    }
    Ok(EXIT_SUCCESS)
}
