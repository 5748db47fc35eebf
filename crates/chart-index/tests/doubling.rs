// File: crates/chart-index/tests/doubling.rs
// Purpose: Binary-doubling pyramid: level sizes, pair merging, tie-breaks and odd tails.

use chart_index::{AggregationIndex, Bucket, LevelKey, Series};

fn ramp(n: usize) -> Series {
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    Series::single_value(x.clone(), x).expect("valid series")
}

fn built(series: Series) -> AggregationIndex {
    let mut index = AggregationIndex::new();
    index.set_data(series);
    index
}

#[test]
fn bucket_count_follows_power_of_two_law() {
    for &n in &[2usize, 3, 7, 8, 10, 17, 1000, 1025] {
        let index = built(ramp(n));
        let mut step = 2u32;
        loop {
            let count = index.bucket_count(LevelKey::Double(step));
            assert_eq!(count, n.div_ceil(step as usize), "n={n} step={step}");
            if count == 1 { break; }
            step *= 2;
        }
        // nothing beyond the single-bucket level
        assert_eq!(index.bucket_count(LevelKey::Double(step * 2)), 0, "n={n}");
    }
}

#[test]
fn levels_are_listed_finest_first() {
    let index = built(ramp(10));
    assert_eq!(
        index.level_names(),
        vec![
            LevelKey::Original,
            LevelKey::Double(2),
            LevelKey::Double(4),
            LevelKey::Double(8),
            LevelKey::Double(16),
        ]
    );
}

#[test]
fn levels_share_one_arena() {
    let index = built(ramp(10));
    let map = index.pyramid().map();
    let mut expected_start = 0;
    for (_, range) in map.iter() {
        assert_eq!(range.start, expected_start);
        expected_start = range.end;
    }
    assert_eq!(expected_start, index.pyramid().len());
    assert_eq!(index.pyramid().len(), 10 + 5 + 3 + 2 + 1);
}

#[test]
fn pair_merge_takes_open_left_and_close_right() {
    let x = vec![0.0, 1.0, 2.0, 3.0];
    let open = vec![10.0, 11.0, 12.0, 13.0];
    let high = vec![15.0, 19.0, 14.0, 13.5];
    let low = vec![9.0, 8.0, 11.0, 12.5];
    let close = vec![10.5, 11.5, 12.5, 13.2];
    let series = Series::new(x, open, Some(high), Some(low), Some(close)).unwrap();
    let index = built(series);

    let level = index.level(LevelKey::Double(2)).unwrap();
    assert_eq!(level.len(), 2);
    let first = level[0];
    assert_eq!((first.start_idx, first.end_idx), (0, 1));
    assert_eq!(first.open, 10.0);
    assert_eq!(first.close, 11.5);
    assert_eq!((first.min_idx, first.min_y, first.min_x), (1, 8.0, 1.0));
    assert_eq!((first.max_idx, first.max_y, first.max_x), (1, 19.0, 1.0));

    let top = index.level(LevelKey::Double(4)).unwrap()[0];
    assert_eq!((top.start_idx, top.end_idx), (0, 3));
    assert_eq!((top.open, top.close), (10.0, 13.2));
    assert_eq!((top.min_y, top.max_y), (8.0, 19.0));
}

#[test]
fn equal_extremes_keep_the_earlier_sample() {
    let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
    let flat = vec![5.0; 8];
    let index = built(Series::single_value(x, flat).unwrap());

    for key in index.level_names() {
        for b in index.level(key).unwrap() {
            assert_eq!(b.min_idx, b.start_idx, "level {key}");
            assert_eq!(b.max_idx, b.start_idx, "level {key}");
        }
    }
}

#[test]
fn odd_tail_is_carried_forward_unchanged() {
    let index = built(ramp(5));
    let d2 = index.level(LevelKey::Double(2)).unwrap();
    let tail: Bucket = d2[2];
    assert_eq!((tail.start_idx, tail.end_idx), (4, 4));
    assert_eq!(tail, index.level(LevelKey::Original).unwrap()[4]);

    let d4 = index.level(LevelKey::Double(4)).unwrap();
    assert_eq!(d4[1], tail);
}

#[test]
fn nan_values_are_not_sanitized() {
    let x = vec![0.0, 1.0, 2.0, 3.0];
    let low = vec![1.0, f64::NAN, 2.0, 3.0];
    let high = vec![1.0, 4.0, f64::INFINITY, 3.0];
    let open = vec![1.0, 2.0, 2.0, 3.0];
    let index = built(Series::new(x, open.clone(), Some(high), Some(low), Some(open)).unwrap());

    let d2 = index.level(LevelKey::Double(2)).unwrap();
    assert!(d2[0].min_y.is_nan());
    assert_eq!(d2[1].max_y, f64::INFINITY);

    // a NaN on the left loses the comparison, so the right extreme wins
    let x = vec![0.0, 1.0, 2.0, 3.0];
    let low = vec![f64::NAN, 1.0, 2.0, 3.0];
    let high = vec![f64::NAN, 4.0, 2.0, 3.0];
    let open = vec![1.0, 2.0, 2.0, 3.0];
    let index = built(Series::new(x, open.clone(), Some(high), Some(low), Some(open)).unwrap());

    let d2 = index.level(LevelKey::Double(2)).unwrap();
    assert_eq!((d2[0].min_idx, d2[0].min_y), (1, 1.0));
    assert_eq!((d2[0].max_idx, d2[0].max_y), (1, 4.0));
}

#[test]
fn single_sample_has_no_coarser_levels() {
    let index = built(ramp(1));
    assert_eq!(index.level_names(), vec![LevelKey::Original]);
    let only = index.level(LevelKey::Original).unwrap();
    assert_eq!((only[0].start_idx, only[0].end_idx), (0, 0));
}
