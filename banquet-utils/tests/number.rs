use banquet_utils::{ceil2, floor2, round2, Addition};

#[test]
fn test_round2() {
    assert_eq!(round2(1.234), 1.23);
    assert_eq!(round2(0.125), 0.13);
    assert_eq!(round2(-0.125), -0.13);
    assert_eq!(round2(100.0), 100.0);
}

#[test]
fn test_ceil_and_floor_after_round2() {
    // 2.0000001 rounds to 2.00 first, so the ceiling does not jump to 3
    assert_eq!(ceil2(2.0000001), 2);
    assert_eq!(ceil2(2.011), 3);
    assert_eq!(floor2(2.999), 3);
    assert_eq!(floor2(2.99), 2);
}

#[test]
fn test_addition_apply() {
    let add = Addition::new(10.0, 50.0);
    assert_eq!(add.apply(100.0), 165.0);
    assert_eq!(Addition::default().apply(42.5), 42.5);
}

#[test]
fn test_addition_reduce() {
    let add = Addition::new(1.0, 50.0);
    assert_eq!(add.reduce(5.0), 2.0);
    assert_eq!(Addition::new(0.0, 20.0).reduce(3.0), 2.4);
}

#[test]
fn test_addition_rounded_accumulation() {
    let mut add = Addition::default();
    add.push_percent_rounded(0.104);
    add.push_percent_rounded(0.104);
    assert_eq!(add.percent, 0.2);
    add.push_abs_rounded(3.0);
    assert_eq!(add.abs, 3.0);
    let mut other = Addition::new(1.0, 1.0);
    other += add;
    assert_eq!(other, Addition::new(4.0, 1.2));
}
