//! English Kokoro voices and their espeak equivalents.
//!
//! The Kokoro renderer uses the speaker ID; the command renderer uses the
//! espeak code so both backends honor `--tts-voice`.

/// Runtime metadata for a TTS voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub speaker_id: i32,
    pub espeak_code: &'static str,
    pub accent: &'static str,
}

const US: &str = "American English";
const GB: &str = "British English";

/// Sorted by name for binary search.
const VOICES: &[(&str, Voice)] = &[
    ("af_alloy", Voice { speaker_id: 0, espeak_code: "en-us", accent: US }),
    ("af_aoede", Voice { speaker_id: 1, espeak_code: "en-us", accent: US }),
    ("af_bella", Voice { speaker_id: 2, espeak_code: "en-us", accent: US }),
    ("af_heart", Voice { speaker_id: 3, espeak_code: "en-us", accent: US }),
    ("af_jessica", Voice { speaker_id: 4, espeak_code: "en-us", accent: US }),
    ("af_kore", Voice { speaker_id: 5, espeak_code: "en-us", accent: US }),
    ("af_nicole", Voice { speaker_id: 6, espeak_code: "en-us", accent: US }),
    ("af_nova", Voice { speaker_id: 7, espeak_code: "en-us", accent: US }),
    ("af_river", Voice { speaker_id: 8, espeak_code: "en-us", accent: US }),
    ("af_sarah", Voice { speaker_id: 9, espeak_code: "en-us", accent: US }),
    ("af_sky", Voice { speaker_id: 10, espeak_code: "en-us", accent: US }),
    ("am_adam", Voice { speaker_id: 11, espeak_code: "en-us", accent: US }),
    ("am_echo", Voice { speaker_id: 12, espeak_code: "en-us", accent: US }),
    ("am_eric", Voice { speaker_id: 13, espeak_code: "en-us", accent: US }),
    ("am_fenrir", Voice { speaker_id: 14, espeak_code: "en-us", accent: US }),
    ("am_liam", Voice { speaker_id: 15, espeak_code: "en-us", accent: US }),
    ("am_michael", Voice { speaker_id: 16, espeak_code: "en-us", accent: US }),
    ("am_onyx", Voice { speaker_id: 17, espeak_code: "en-us", accent: US }),
    ("am_puck", Voice { speaker_id: 18, espeak_code: "en-us", accent: US }),
    ("am_santa", Voice { speaker_id: 19, espeak_code: "en-us", accent: US }),
    ("bf_alice", Voice { speaker_id: 20, espeak_code: "en-gb", accent: GB }),
    ("bf_emma", Voice { speaker_id: 21, espeak_code: "en-gb", accent: GB }),
    ("bf_isabella", Voice { speaker_id: 22, espeak_code: "en-gb", accent: GB }),
    ("bf_lily", Voice { speaker_id: 23, espeak_code: "en-gb", accent: GB }),
    ("bm_daniel", Voice { speaker_id: 24, espeak_code: "en-gb", accent: GB }),
    ("bm_fable", Voice { speaker_id: 25, espeak_code: "en-gb", accent: GB }),
    ("bm_george", Voice { speaker_id: 26, espeak_code: "en-gb", accent: GB }),
    ("bm_lewis", Voice { speaker_id: 27, espeak_code: "en-gb", accent: GB }),
];

/// Look up a voice by name.
pub fn get_voice(name: &str) -> Option<&'static Voice> {
    VOICES.binary_search_by_key(&name, |(n, _)| n).ok().map(|idx| &VOICES[idx].1)
}

/// Print the voice table.
pub fn print_voices() {
    for accent in [US, GB] {
        println!("\n── {} ──", accent);
        println!("{:<13} {:<4} ESPEAK", "VOICE", "ID");
        for (name, voice) in VOICES.iter().filter(|(_, v)| v.accent == accent) {
            println!("{:<13} {:<4} {}", name, voice.speaker_id, voice.espeak_code);
        }
    }
    println!();
    println!("Usage: sign-speech <EVENTS> --tts-voice bf_emma");
}

/// Print one voice.
pub fn print_voice_info(name: &str) -> anyhow::Result<()> {
    let voice = get_voice(name).ok_or_else(|| anyhow::anyhow!("Voice '{}' not found. Run with --list-voices to see available voices", name))?;

    println!("Voice:       {}", name);
    println!("Accent:      {}", voice.accent);
    println!("Speaker ID:  {}", voice.speaker_id);
    println!("espeak code: {}", voice.espeak_code);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(VOICES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_speaker_ids_are_contiguous() {
        let mut ids: Vec<i32> = VOICES.iter().map(|(_, v)| v.speaker_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..=27).collect::<Vec<_>>());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get_voice("bf_emma").map(|v| v.speaker_id), Some(21));
        assert_eq!(get_voice("af_bella").map(|v| v.espeak_code), Some("en-us"));
        assert_eq!(get_voice("am_santa").map(|v| v.speaker_id), Some(19));
        assert!(get_voice("zz_nobody").is_none());
        assert!(print_voice_info("zz_nobody").is_err());
    }
}
