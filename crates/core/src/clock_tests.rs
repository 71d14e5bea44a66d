use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn fake_clock_advance_moves_both_scales() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    let ms1 = clock.epoch_ms();
    clock.advance(Duration::from_secs(60));
    assert!(clock.now().duration_since(t1) >= Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), ms1 + 60_000);
}

#[test]
fn fake_clock_is_shared_between_clones() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.epoch_ms(), clock2.epoch_ms());
}

#[test]
fn compact_timestamp_formats_utc() {
    // 2023-11-14T22:13:20Z
    assert_eq!(compact_timestamp(1_700_000_000_000), "20231114_221320");
}

#[test]
fn compact_date_formats_utc() {
    assert_eq!(compact_date(1_700_000_000_000), "20231114");
}

#[test]
fn iso8601_is_parseable() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let rendered = clock.iso8601();
    assert!(rendered.starts_with("2023-11-14T22:13:20"));
}
