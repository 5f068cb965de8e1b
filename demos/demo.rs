//! Example of using scalarlog from Rust: the default logger, retargeting it,
//! and a dedicated logger with derived metrics.

use std::thread;
use std::time::Duration;

use scalarlog::{global, Logger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. The default logger writes to ./logs on first use
    for i in 0..10 {
        scalarlog::record("foo", i as f64, None)?;
    }
    for j in 10..20 {
        scalarlog::record("bar", j as f64, None)?;
    }

    // 2. Point the default logger somewhere else
    global::configure_default_target("logs2")?;
    for k in 20..30 {
        scalarlog::record("baz", k as f64, None)?;
    }
    for l in 0..5 {
        scalarlog::record("qux", l as f64, Some(10 * l))?;
    }

    // 3. A dedicated logger
    let mut logger = Logger::open("logs3")?;
    for i in 0..10 {
        logger.log("quux", i as f64, None)?;
    }
    logger.log_list_statistics("quuz", &[1.0, 2.0, 3.0, 4.0, 5.0])?;

    logger.measure_rate("corge", 10.0)?;
    thread::sleep(Duration::from_secs(1));
    logger.measure_rate("corge", 20.0)?; // rate: (20 - 10) / 1
    thread::sleep(Duration::from_secs(2));
    logger.measure_rate("corge", 30.0)?; // rate: (30 - 20) / 2

    logger.close()?;
    global::close_default()?;
    println!("Wrote event files to logs/, logs2/ and logs3/");
    Ok(())
}
