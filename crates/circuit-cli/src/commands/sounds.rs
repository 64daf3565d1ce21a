use circuit_core::SoundId;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    for sound in SoundId::ALL {
        let notes: Vec<String> = sound
            .score()
            .iter()
            .map(|n| format!("{:.0}Hz@{:.2}s", n.frequency_hz, n.offset_secs))
            .collect();
        println!(
            "{:<12} {:>5.2}s  {}",
            sound.as_str(),
            sound.length_secs(),
            notes.join(" ")
        );
    }
    Ok(())
}
