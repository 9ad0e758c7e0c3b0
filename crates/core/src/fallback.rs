//! Placeholder video artifact for credential-less operation.
//!
//! When no inference API token is configured, jobs still run through the
//! full lifecycle and produce this fixed, minimal MP4 so downstream
//! consumers (players, UI polling) exercise the same contract as the
//! real path.

/// Smallest MP4 container structure standard players accept: `ftyp`,
/// `free`, a minimal `mdat`, and a minimal `moov` box.
const MINIMAL_MP4: [u8; 96] = [
    // ftyp box (file type)
    0x00, 0x00, 0x00, 0x20, 0x66, 0x74, 0x79, 0x70, 0x69, 0x73, 0x6F, 0x6D, //
    0x00, 0x00, 0x02, 0x00, 0x69, 0x73, 0x6F, 0x6D, 0x69, 0x73, 0x6F, 0x32, //
    0x61, 0x76, 0x63, 0x31, 0x6D, 0x70, 0x34, 0x31, //
    // free box
    0x00, 0x00, 0x00, 0x08, 0x66, 0x72, 0x65, 0x65, //
    // mdat box (minimal media data)
    0x00, 0x00, 0x00, 0x10, 0x6D, 0x64, 0x61, 0x74, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    // moov box (minimal movie metadata)
    0x00, 0x00, 0x00, 0x28, 0x6D, 0x6F, 0x6F, 0x76, //
    0x00, 0x00, 0x00, 0x6C, 0x6D, 0x76, 0x68, 0x64, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xE8, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
];

/// Deterministic placeholder artifact bytes.
pub fn placeholder_mp4() -> &'static [u8] {
    &MINIMAL_MP4
}
