//! Tests for the protocol engine's state machine and dispatch path

mod common;

use common::*;

#[test]
fn test_empty_stream_reports_no_command() {
    let mut engine = test_engine();
    let mut input = stream(&[]);

    assert_eq!(engine.receive_command(&mut input), Command::NoCommand);
    assert!(!engine.is_capturing());
}

#[test]
fn test_single_byte_commands_pass_through() {
    let mut engine = test_engine();
    let mut input = stream(&[3, 4, 0xAB]);

    assert_eq!(engine.receive_command(&mut input), Command::Start);
    assert!(!engine.is_capturing());

    assert_eq!(engine.receive_command(&mut input), Command::Stop);
    assert!(!engine.is_capturing());

    assert_eq!(engine.receive_command(&mut input), Command::Unknown(0xAB));
    assert!(!engine.is_capturing());
}

#[test]
fn test_framed_command_opens_capture() {
    let mut engine = test_engine();
    let mut input = stream(&[1]);

    assert_eq!(engine.receive_command(&mut input), Command::QueryData);
    assert!(engine.is_capturing());
}

#[test]
fn test_receive_reports_opening_command_while_capturing() {
    let mut engine = test_engine();
    let mut input = stream(&[2, 3, 4, 0xAB]);

    assert_eq!(engine.receive_command(&mut input), Command::SetVolume);

    // framing has begun: top-level reads keep reporting the in-flight
    // command, whatever bytes arrive
    assert_eq!(engine.receive_command(&mut input), Command::SetVolume);
    assert_eq!(engine.receive_command(&mut input), Command::SetVolume);
    assert_eq!(engine.receive_command(&mut input), Command::SetVolume);
}

#[test]
fn test_volume_frame_end_to_end() {
    let mut engine = test_engine();
    let mut input = stream(&[2, 0x41, 75, 0]);

    assert_eq!(engine.receive_command(&mut input), Command::SetVolume);

    // payload bytes, then the end-of-data finalize, then the consume tick
    for _ in 0..5 {
        engine.advance(&mut input).expect("dispatch must succeed");
    }

    assert!(!engine.is_capturing());

    let speaker = engine.registry().get(b'A').expect("speaker A is configured");
    assert_eq!(speaker.volume(), 75);

    // (100 - 75) * 255 / 100 truncates to 63
    assert_eq!(engine.registry().bus().writes, vec![(5, PotChannel::Pot0, 63)]);
}

#[test]
fn test_eof_mid_frame_finalizes_then_consumes() {
    let mut engine = test_engine();
    let mut input = stream(&[2, 0x41]);

    engine.receive_command(&mut input);
    engine.advance(&mut input).unwrap();

    // stream exhausted: this tick finalizes the frame
    engine.advance(&mut input).unwrap();
    let frame = engine.current_frame().expect("frame still held");
    assert!(frame.is_done());
    assert_eq!(frame.contents(), &[0x41]);

    // one more tick consumes it; the truncated payload is discarded,
    // never an error
    engine.advance(&mut input).unwrap();
    assert!(!engine.is_capturing());

    let speaker = engine.registry().get(b'A').unwrap();
    assert_eq!(speaker.volume(), 50, "truncated frame must not change volume");
    assert!(engine.registry().bus().writes.is_empty());
}

#[test]
fn test_unknown_speaker_surfaces_not_found() {
    let mut engine = test_engine();
    let mut input = stream(&[2, b'Z', 10, 0]);

    engine.receive_command(&mut input);

    let mut result = Ok(());
    while engine.is_capturing() {
        result = engine.advance(&mut input);
    }

    assert!(matches!(result, Err(SbError::SpeakerNotFound(id)) if id == b'Z'));

    // configured speakers are untouched and the engine is idle again
    assert_eq!(engine.registry().get(b'A').unwrap().volume(), 50);
    assert_eq!(engine.registry().get(b'B').unwrap().volume(), 50);
    assert!(engine.registry().bus().writes.is_empty());
    assert!(!engine.is_capturing());
}

#[test]
fn test_capture_never_exceeds_capacity() {
    let mut engine = test_engine();

    let mut bytes = vec![1u8];
    bytes.extend(std::iter::repeat_n(0x55, 64));
    let mut input = stream(&bytes);

    engine.receive_command(&mut input);

    while engine.is_capturing() {
        if let Some(frame) = engine.current_frame() {
            assert!(frame.contents().len() <= MAX_PACKET_SIZE);
        }

        engine.advance(&mut input).unwrap();
    }
}

#[test]
fn test_full_buffer_finalizes_frame() {
    let mut engine = test_engine();

    let mut bytes = vec![1u8];
    bytes.extend(std::iter::repeat_n(0x55, 40));
    let mut input = stream(&bytes);

    engine.receive_command(&mut input);

    for _ in 0..MAX_PACKET_SIZE {
        engine.advance(&mut input).unwrap();
    }

    let frame = engine.current_frame().expect("frame still held");
    assert!(frame.is_done(), "reaching capacity finalizes the frame");
    assert_eq!(frame.contents().len(), MAX_PACKET_SIZE);

    // the consume tick discards the completed query frame silently
    engine.advance(&mut input).unwrap();
    assert!(!engine.is_capturing());
}

#[test]
fn test_query_frame_discarded_without_dispatch() {
    let mut engine = test_engine();
    let mut input = stream(&[1]);

    engine.receive_command(&mut input);
    engine.advance(&mut input).unwrap();
    engine.advance(&mut input).unwrap();

    assert!(!engine.is_capturing());
    assert!(engine.registry().bus().writes.is_empty());
}

#[test]
fn test_back_to_back_volume_frames() {
    let mut engine = test_engine();
    let mut input = stream(&encode_set_volume(b'A', 100));

    engine.receive_command(&mut input);
    while engine.is_capturing() {
        engine.advance(&mut input).unwrap();
    }

    let mut input = stream(&encode_set_volume(b'B', 0));

    engine.receive_command(&mut input);
    while engine.is_capturing() {
        engine.advance(&mut input).unwrap();
    }

    assert_eq!(engine.registry().get(b'A').unwrap().volume(), 100);
    assert_eq!(engine.registry().get(b'B').unwrap().volume(), 0);
    assert_eq!(
        engine.registry().bus().writes,
        vec![(5, PotChannel::Pot0, 0), (5, PotChannel::Pot1, 255)]
    );
}
