use circuit_core::timer::{format_clock, total_duration, SegmentKind};
use circuit_core::{Config, Sequence};

use super::load_timer;

pub fn run(timer: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let def = load_timer(&config, timer)?;
    let seq = Sequence::from(&def);

    println!("{}", seq.name);
    for (i, segment) in seq.segments.iter().enumerate() {
        let kind = match segment.kind {
            SegmentKind::Interval => "",
            SegmentKind::Interim => " (interim)",
        };
        let length = if segment.is_hold() {
            format!("{} reps", segment.reps)
        } else {
            format_clock(segment.duration_secs)
        };
        let sound = seq
            .completion_sound(i)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "silent".to_string());
        println!("  {:>2}. {}{kind}  {length}  [{sound}]", i + 1, segment.name);
    }
    println!("Repeats: {}", seq.repeat_count);
    println!("Total: {}", format_clock(total_duration(&seq)));
    Ok(())
}
