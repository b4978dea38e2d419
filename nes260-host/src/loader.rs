//! Sending commands to the board
//!
//! Writers are generic so the framing can be checked against an in-memory
//! buffer; in the CLI the writer is the serial port.

use std::io::Write;

use anyhow::Context;
use nes260_protocol::{HostCommand, InesHeader, Mirroring, TvSystem};

/// Write `cmd` to `out`, payload split into `chunk_size` writes
///
/// `progress` is called after every payload chunk with the bytes sent so
/// far and the payload total. Returns the number of bytes written.
pub fn send_command<W, F>(
    out: &mut W,
    cmd: &HostCommand<'_>,
    chunk_size: usize,
    mut progress: F,
) -> anyhow::Result<usize>
where
    W: Write + ?Sized,
    F: FnMut(usize, usize),
{
    let header = cmd.header()?;
    out.write_all(&header).context("failed to write command header")?;

    let payload = cmd.payload();
    let mut sent = 0;
    for chunk in payload.chunks(chunk_size.max(1)) {
        out.write_all(chunk).context("failed to write image data")?;
        sent += chunk.len();
        progress(sent, payload.len());
    }

    out.flush().context("failed to flush serial port")?;
    Ok(header.len() + sent)
}

/// Human-readable description of an iNES image
pub fn describe_image(image: &[u8]) -> String {
    let header = match InesHeader::parse(image) {
        Ok(header) => header,
        Err(e) => return format!("Size: {} bytes (not an iNES file: {})", image.len(), e),
    };

    let mirroring = match header.mirroring() {
        Mirroring::Horizontal => "horizontal",
        Mirroring::Vertical => "vertical",
        Mirroring::FourScreen => "four-screen",
    };
    let tv = match header.tv_system() {
        TvSystem::Ntsc => "NTSC",
        TvSystem::Pal => "PAL",
    };

    let mut text = format!(
        "Size: {} bytes, Mapper: {}, PRG: {}KB, CHR: {}KB, {} mirroring, {}",
        image.len(),
        header.mapper(),
        header.prg_rom_len() / 1024,
        header.chr_rom_len() / 1024,
        mirroring,
        tv,
    );
    if header.has_battery() {
        text.push_str(", battery");
    }
    if header.is_nes2() {
        text.push_str(", NES 2.0");
    }
    if image.len() < header.expected_file_len() {
        text.push_str(&format!(
            " (truncated: header implies {} bytes)",
            header.expected_file_len()
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes260_protocol::{
        ButtonPair, Buttons, Session, MAX_IMAGE_LEN, WORD_LOAD_IMAGE, WORD_RESET_LOADER,
    };

    /// Minimal NROM image: header, 16K PRG, 8K CHR
    fn nrom_image() -> Vec<u8> {
        let mut image = b"NES\x1A".to_vec();
        image.extend_from_slice(&[1, 1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        image.resize(16 + 16 * 1024 + 8 * 1024, 0xEA);
        image
    }

    /// Feed a written stream through a board-side session
    fn board_words(stream: &[u8]) -> Vec<u32> {
        let mut session = Session::new();
        let mut words = Vec::new();
        let mut rest = stream;
        while rest.len() >= session.bytes_needed() {
            let (chunk, tail) = rest.split_at(session.bytes_needed());
            rest = tail;
            if let Ok(Some(dispatch)) = session.process(chunk) {
                words.extend(dispatch.words());
            }
        }
        words
    }

    #[test]
    fn test_image_stream_in_chunks() {
        let image = nrom_image();
        let mut out = Vec::new();
        let mut calls = Vec::new();

        let written = send_command(&mut out, &HostCommand::LoadImage(&image), 1024, |sent, total| {
            calls.push((sent, total))
        })
        .unwrap();

        assert_eq!(written, image.len() + 5);
        assert_eq!(out[0], 1);
        assert_eq!(&out[1..5], &(image.len() as u32).to_le_bytes());
        assert_eq!(&out[5..], &image[..]);
        assert_eq!(calls.len(), image.len().div_ceil(1024));
        assert_eq!(calls.last(), Some(&(image.len(), image.len())));
    }

    #[test]
    fn test_board_sees_same_image() {
        let image = nrom_image();
        let mut out = Vec::new();
        send_command(&mut out, &HostCommand::LoadImage(&image), 700, |_, _| {}).unwrap();

        let words = board_words(&out);
        assert_eq!(words.len(), image.len() + 3);
        assert_eq!(&words[..3], &[WORD_RESET_LOADER, WORD_LOAD_IMAGE, image.len() as u32]);
        assert!(words[3..].iter().zip(&image).all(|(w, b)| *w == *b as u32));
    }

    #[test]
    fn test_buttons_then_image() {
        let mut out = Vec::new();
        let pair = ButtonPair::new(Buttons::parse("a+start").unwrap(), Buttons::empty());
        send_command(&mut out, &HostCommand::Buttons(pair), 1024, |_, _| {}).unwrap();
        send_command(&mut out, &HostCommand::LoadImage(&[0x42]), 1024, |_, _| {}).unwrap();

        assert_eq!(
            board_words(&out),
            [0x0000_0903, WORD_RESET_LOADER, WORD_LOAD_IMAGE, 1, 0x42]
        );
    }

    #[test]
    fn test_refuses_unloadable_image() {
        let mut out = Vec::new();
        let image = vec![0u8; MAX_IMAGE_LEN as usize];
        assert!(send_command(&mut out, &HostCommand::LoadImage(&image), 1024, |_, _| {}).is_err());
        assert!(send_command(&mut out, &HostCommand::LoadImage(&[]), 1024, |_, _| {}).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_describe_image() {
        let text = describe_image(&nrom_image());
        assert!(text.contains("Mapper: 0"));
        assert!(text.contains("PRG: 16KB, CHR: 8KB"));
        assert!(text.contains("vertical mirroring"));
        assert!(!text.contains("truncated"));
    }

    #[test]
    fn test_describe_truncated_and_foreign() {
        let image = nrom_image();
        assert!(describe_image(&image[..1024]).contains("truncated"));
        assert!(describe_image(b"PK\x03\x04 not a rom").contains("not an iNES file"));
    }
}
