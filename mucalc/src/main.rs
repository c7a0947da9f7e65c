use anyhow::{bail, Context};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use mucalc::{analyze, parse_aut, parse_mucalc, solve_emerson_lei, solve_naive, strip_comments};

fn main() -> anyhow::Result<()> {
    init_logger()?;

    let aut_path = std::env::args().nth(1).context("No aut file provided")?;
    let mucalc_path = std::env::args().nth(2).context("No mucalc file provided")?;
    let algorithm = std::env::args().nth(3).unwrap_or_else(|| "el".to_string());

    let now = std::time::Instant::now();

    let aut_file = std::fs::read_to_string(&aut_path)
        .with_context(|| format!("Failed to read aut file {aut_path}"))?;
    let mucalc_file = std::fs::read_to_string(&mucalc_path)
        .with_context(|| format!("Failed to read mucalc file {mucalc_path}"))?;

    let lts = parse_aut(&aut_file).context("Failed to parse aut file")?;
    let mucalc = parse_mucalc(&strip_comments(&mucalc_file)).context("Failed to parse mucalc file")?;

    log::info!("{} states, {} transitions", lts.state_count(), lts.transition_count());
    println!("Formula: {mucalc}");
    println!(
        "Nesting depth {}, alternation depth {}, dependent alternation depth {}",
        mucalc.nesting_depth(),
        mucalc.alternation_depth(),
        mucalc.dependent_alternation_depth()
    );

    let solution = match algorithm.as_str() {
        "naive" => {
            println!("Preprocessing took {:?}", now.elapsed());
            solve_naive(&mucalc, &lts)?
        }
        "el" => {
            let analysis = analyze(&mucalc);
            println!("Preprocessing took {:?}", now.elapsed());
            solve_emerson_lei(&mucalc, &analysis, &lts)?
        }
        other => bail!("Unknown algorithm {other:?}, expected naive or el"),
    };

    println!("Solution: {solution}");
    println!("The formula {} satisfied", if solution.holds(&lts) { "is" } else { "is not" });

    Ok(())
}

// `MUCALC_LOG` picks the level, info by default.
fn init_logger() -> anyhow::Result<()> {
    let level = std::env::var("MUCALC_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);

    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)?;
    Ok(())
}
