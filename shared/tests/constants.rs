use shared::constants::*;

#[test]
fn reader_data_ioctl_matches_driver_code() {
    assert_eq!(IOCTL_REQUEST_READER_DATA, 0x000B_4CDC);
}

#[test]
fn ctl_code_places_each_field() {
    assert_eq!(ctl_code(0x22, 0x800, 0, 0), 0x0022_2000);
    assert_eq!(ctl_code(0x22, 0x800, 3, 3), 0x0022_E003);
}

#[test]
fn interface_guid_fields() {
    let data1 = (FILTER_DEVICE_INTERFACE >> 96) as u32;
    let data2 = (FILTER_DEVICE_INTERFACE >> 80) as u16;
    let data3 = (FILTER_DEVICE_INTERFACE >> 64) as u16;
    let data4 = (FILTER_DEVICE_INTERFACE as u64).to_be_bytes();

    assert_eq!(data1, 0x39AD_5308);
    assert_eq!(data2, 0x66FC);
    assert_eq!(data3, 0x11EA);
    assert_eq!(data4, [0xBC, 0x55, 0x02, 0x42, 0xAC, 0x13, 0x00, 0x03]);
}
