// src/main.rs
//
// Native sanity run: plays a chord from each input source through the
// built-in oscillator bank and prints block peaks.

use synthkeys::{
    Instrument, KeyboardConfig, OscillatorBank, PointerAction, Transition, VoiceKey, Waveform,
};

const SAMPLE_RATE: f64 = 48_000.0;
const MAX_VOICES: usize = 8;
const BLOCK_FRAMES: usize = 256;

fn render_blocks(keys: &mut Instrument<OscillatorBank>, blocks: usize) {
    let mut block = vec![0.0_f32; BLOCK_FRAMES];
    for _ in 0..blocks {
        keys.backend_mut().render(&mut block);
        let peak = block.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        println!("{} voices, peak {:.3}", keys.active_voices(), peak);
    }
}

fn main() {
    let config = KeyboardConfig {
        waveform: Waveform::Triangle,
        volume: 0.3,
        ..KeyboardConfig::default()
    };
    let mut keys = Instrument::new(OscillatorBank::new(SAMPLE_RATE, MAX_VOICES), config);

    println!("Starting keyboard sanity test…");
    println!("{} keys drawn", keys.layout().len());

    // --------------------------------
    // Pointer: C2 (first drawn key)
    // --------------------------------
    let result = keys.pointer(0, PointerAction::Down { buttons: 1 });
    println!("pointer down on key 0: {:?}", result);

    // --------------------------------
    // Computer keyboard: E2
    // --------------------------------
    println!("KeyC down: {:?}", keys.key_down("KeyC"));
    println!("KeyC repeat: {:?}", keys.key_down("KeyC"));

    // --------------------------------
    // MIDI: G4 note-on
    // --------------------------------
    println!("MIDI note-on 67: {:?}", keys.midi_message(&[0x90, 67, 100]));

    render_blocks(&mut keys, 2);

    // Velocity-0 note-on ends the MIDI note
    let off = keys.midi_message(&[0x90, 67, 0]);
    println!(
        "MIDI note-on 67 velocity 0: {:?} (stopped: {})",
        off,
        off == Ok(Transition::Stopped)
    );

    println!("C2 still sounding: {}", keys.is_sounding(VoiceKey::Midi(36)));
    println!("panic stopped {} voices", keys.panic());

    render_blocks(&mut keys, 1);

    println!("Sanity test completed.");
}
