//! Tests for the TIFF types module

use crate::io::byte_order::ByteOrder;
use crate::tiff::types::TIFF;
use crate::tiff::ifd::{IFD, IFDEntry};

#[test]
fn test_tiff_creation() {
    let tiff = TIFF::new(false, ByteOrder::LittleEndian);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 0);
    assert!(tiff.main_ifd().is_none());
}

#[test]
fn test_tiff_with_ifds() {
    let mut tiff = TIFF::new(true, ByteOrder::BigEndian);

    let mut main_ifd = IFD::new(0, 16);
    main_ifd.add_entry(IFDEntry::new(256, 4, 1, 1024));
    main_ifd.add_entry(IFDEntry::new(257, 4, 1, 768));
    tiff.ifds.push(main_ifd);

    // Reduced resolution subfile
    let mut overview_ifd = IFD::new(1, 100);
    overview_ifd.add_entry(IFDEntry::new(254, 4, 1, 1));
    overview_ifd.add_entry(IFDEntry::new(256, 4, 1, 512));
    overview_ifd.add_entry(IFDEntry::new(257, 4, 1, 384));
    tiff.ifds.push(overview_ifd);

    assert_eq!(tiff.ifd_count(), 2);
    assert_eq!(tiff.overview_count(), 1);
    assert_eq!(tiff.main_ifd().and_then(|ifd| ifd.get_dimensions()), Some((1024, 768)));
    assert!(tiff.to_string().contains("BigTIFF"));
}

#[test]
fn test_replace_entry_keeps_one_copy() {
    let mut ifd = IFD::new(0, 8);
    ifd.add_entry(IFDEntry::new(259, 3, 1, 1));
    ifd.replace_entry(IFDEntry::new(259, 3, 1, 8));

    assert_eq!(ifd.entry_count(), 1);
    assert_eq!(ifd.get_tag_value(259), Some(8));
}
