// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Era resolution through opened sessions.
//!
//! Run with: cargo test --test subarray_tests

mod common;

use std::sync::Arc;

use common::{builder, open, DstFixture};
use hessdst::instrument::{Era, SubarrayResolver};

fn era_of(run: u32) -> Era {
    let reader = DstFixture::new(run, 1).reader();
    open(&reader).subarray().era
}

#[test]
fn test_boundary_runs() {
    assert_eq!(era_of(1), Era::Hess1);
    assert_eq!(era_of(15_999), Era::Hess1);
    assert_eq!(era_of(16_000), Era::Hess2);
    assert_eq!(era_of(159_999), Era::Hess2);
    assert_eq!(era_of(160_000), Era::HessFlashCam);
    assert_eq!(era_of(u32::MAX), Era::HessFlashCam);
}

#[test]
fn test_sessions_share_era_config() {
    let resolver = Arc::new(SubarrayResolver::hess());
    let a = DstFixture::new(170_720, 1).reader();
    let b = DstFixture::new(180_000, 1).reader();

    let sa = builder(&a).resolver(Arc::clone(&resolver)).build().unwrap();
    let sb = builder(&b).resolver(Arc::clone(&resolver)).build().unwrap();
    assert!(Arc::ptr_eq(sa.subarray(), sb.subarray()));
}

#[test]
fn test_custom_era_table() {
    let resolver = SubarrayResolver::new(
        Era::Hess1.config(),
        vec![(100, Era::HessFlashCam.config())],
    )
    .unwrap();
    let reader = DstFixture::new(150, 2).telescopes(&[5]).reader();

    let source = builder(&reader).resolver(Arc::new(resolver)).build().unwrap();
    assert_eq!(source.subarray().era, Era::HessFlashCam);

    let event = source.into_iter().next().unwrap().unwrap();
    assert!(event.image(5).is_some());
}

#[test]
fn test_hess1_run_ignores_ct5() {
    let reader = DstFixture::new(10_000, 2).telescopes(&[1, 5]).reader();
    let source = open(&reader);

    assert_eq!(source.subarray().n_tels(), 4);
    assert!(!source.subarray().contains(5));

    let event = source.into_iter().next().unwrap().unwrap();
    assert!(event.image(1).is_some());
    assert!(event.image(5).is_none());
}
