use std::path::PathBuf;
use std::time::Instant;

use ai_storyteller::config::Settings;
use ai_storyteller::engines::diffrhythm::{DiffRhythm, MusicRequestBuilder};
use ai_storyteller::utils::{clean_lyric_lines, write_lrc, SecretResolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = Settings::from_env()?;
    let engine = DiffRhythm::new(&settings)?;
    println!("Using script {}", engine.script_path().display());

    // The model weights come from the Hugging Face hub; the script reads the
    // token from its environment if one is configured.
    match SecretResolver::from_settings(&settings).get("HF_TOKEN") {
        Ok(_) => println!("HF_TOKEN available"),
        Err(e) => println!("Continuing without HF_TOKEN: {e}"),
    }

    let lyrics = "Sure! Here is a short song:\n\
                  [00:10.00]Lanterns glowing on the bay\n\
                  [00:14.20]The old sailor finds his way\n\
                  Hope you like it.";
    let lines = clean_lyric_lines(Some(lyrics));
    let lrc_path = PathBuf::from("output/demo/lyrics.lrc");
    write_lrc(&lrc_path, &lines)?;

    let request = MusicRequestBuilder::default()
        .prompt("Gentle sea shanty with accordion")
        .lrc_path(lrc_path)
        .output_dir("output/demo")
        .output_file_name("shanty.wav")
        .build()?;

    let start = Instant::now();
    match engine.try_generate(&request)? {
        Some(track) => {
            println!("Generated {} in {:.2?}", track.path.display(), start.elapsed());
            if let Ok(secs) = track.duration_secs() {
                println!("Track length: {secs:.1}s");
            }
        }
        None => println!("Music generation failed; see the log for script output"),
    }

    Ok(())
}
