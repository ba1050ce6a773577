use super::{failure_line, json_pretty, EXIT_SUCCESS};
use docky_core::{Operation, Reconciler};
use docky_runtime::ContainerEngine;
use docky_schema::Config;

pub fn run(
    config: &Config,
    engine: &dyn ContainerEngine,
    operation: Operation,
    names: &[String],
    json: bool,
) -> Result<u8, String> {
    let outcomes = Reconciler::new(config, engine)
        .run(operation, names)
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&outcomes)?);
        return Ok(EXIT_SUCCESS);
    }
    for outcome in &outcomes {
        for line in &outcome.lines {
            if outcome.ok {
                println!("{line}");
            } else {
                println!("{}", failure_line(line));
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
