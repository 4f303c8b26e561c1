use crate::maths::u24;
use crate::memory::{MappingType, Rom};

/// Build a minimal LoROM image with a valid header and reset/NMI vectors.
fn lorom_image() -> Vec<u8> {
    let mut data = vec![0_u8; 0x10000];
    // 21-byte zero-padded printable title at file offset 0x7FC0.
    for (i, c) in b"TEST".iter().enumerate() {
        data[0x7FC0 + i] = *c;
    }
    // Header-declared size of 2048 KiB-units.
    data[0x7FD7] = 0x01;
    // NMI and reset vectors.
    data[0x7FEA] = 0x00;
    data[0x7FEB] = 0x90;
    data[0x7FFC] = 0x00;
    data[0x7FFD] = 0x80;
    data
}

/// Build a minimal HiROM image, title at file offset 0xFFC0.
fn hirom_image() -> Vec<u8> {
    let mut data = vec![0_u8; 0x10000];
    for (i, c) in b"TEST".iter().enumerate() {
        data[0xFFC0 + i] = *c;
    }
    // LoROM candidate position holds junk so only HiROM scores.
    data[0x7FC0] = 0xFF;
    data[0xFFFC] = 0x00;
    data[0xFFFD] = 0x80;
    data
}

#[test]
fn ram_classification() {
    assert!(Rom::is_ram(u24::from(0x00_0000_u32)));
    assert!(Rom::is_ram(u24::from(0x00_1FFF_u32)));
    assert!(Rom::is_ram(u24::from(0x7E_0000_u32)));
    assert!(Rom::is_ram(u24::from(0x7F_FFFF_u32)));

    assert!(!Rom::is_ram(u24::from(0x00_2000_u32)));
    assert!(!Rom::is_ram(u24::from(0x80_0000_u32)));
    assert!(!Rom::is_ram(u24::from(0xC0_0000_u32)));
}

#[test]
fn lorom_is_detected() {
    let rom = Rom::from_bytes(lorom_image());
    assert_eq!(rom.mapping(), MappingType::LoRom);
    assert_eq!(rom.title(), "TEST");
}

#[test]
fn hirom_is_detected() {
    let rom = Rom::from_bytes(hirom_image());
    assert_eq!(rom.mapping(), MappingType::HiRom);
    assert_eq!(rom.title(), "TEST");
}

#[test]
fn small_images_default_to_lorom() {
    let rom = Rom::from_bytes(vec![0_u8; 0x4000]);
    assert_eq!(rom.mapping(), MappingType::LoRom);
}

#[test]
fn lorom_translation() {
    let rom = Rom::from_bytes(lorom_image());
    assert_eq!(rom.translate(u24::from(0x00_8000_u32)), 0x0000);
    assert_eq!(rom.translate(u24::from(0x00_FFFC_u32)), 0x7FFC);
    assert_eq!(rom.translate(u24::from(0x01_8123_u32)), 0x8123);
    // Banks 0x80+ mirror the low half of the bus.
    assert_eq!(rom.translate(u24::from(0x80_8000_u32)), 0x0000);
}

#[test]
fn hirom_translation() {
    let rom = Rom::from_bytes(hirom_image());
    assert_eq!(rom.translate(u24::from(0xC0_0000_u32)), 0x0000);
    assert_eq!(rom.translate(u24::from(0xC1_1234_u32)), 0x01_1234);
    assert_eq!(rom.translate(u24::from(0x40_FFFC_u32)), 0x00_FFFC);
}

#[test]
fn vectors_read_little_endian() {
    let rom = Rom::from_bytes(lorom_image());
    assert_eq!(rom.reset_vector(), u24::from(0x8000_u32));
    assert_eq!(rom.nmi_vector(), u24::from(0x9000_u32));
}

#[test]
fn header_size() {
    let rom = Rom::from_bytes(lorom_image());
    assert_eq!(rom.size(), 2048);
    assert_eq!(rom.real_size(), 0x10000);
}

#[test]
fn word_and_address_reads_compose_bytes() {
    let mut data = lorom_image();
    data[0x0000] = 0x78;
    data[0x0001] = 0x56;
    data[0x0002] = 0x34;
    let rom = Rom::from_bytes(data);

    assert_eq!(rom.read_word(u24::from(0x00_8000_u32)), 0x5678);
    assert_eq!(
        rom.read_address(u24::from(0x00_8000_u32)),
        u24::from(0x34_5678_u32)
    );
}

#[test]
fn out_of_image_reads_are_zero() {
    let rom = Rom::from_bytes(vec![0xAA_u8; 0x100]);
    assert_eq!(rom.read_byte(u24::from(0x00_8000_u32)), 0xAA);
    assert_eq!(rom.read_byte(u24::from(0x3F_FFFF_u32)), 0x00);
}
