use proptest::prelude::*;
use rk4tex_core::{Coefficient, Direction, InputError, MalformedReason, Order, StencilKey};
use rk4tex_extract::{build_table, load_dir, parse_document, SourceDocument};
use rk4tex_test_utils::{fixtures, write_stencil_dir};

fn key(direction: Direction, order: u32) -> StencilKey {
    StencilKey::new(direction, Order::new(order).unwrap())
}

#[test]
fn fixture_directory_builds_full_table() {
    let dir = write_stencil_dir(fixtures::standard_documents()).unwrap();
    let docs = load_dir(dir.path()).unwrap();
    let table = build_table(&docs).unwrap();
    for direction in Direction::ALL {
        assert!(table.contains(&key(direction, 2)), "{direction} order 2");
        assert!(table.contains(&key(direction, 4)), "{direction} order 4");
    }
    let radial4 = table.get(&key(Direction::Radial, 4)).unwrap();
    assert_eq!(radial4.width(), 5);
    assert_eq!(radial4.spacing_power, 1);
    assert_eq!(
        radial4.coefficient_at(-1),
        Some(Coefficient::rational(-2, 3).unwrap())
    );
}

#[test]
fn worked_example_radial_order_two() {
    let stencils =
        parse_document("stencil_radial_2.tex", fixtures::RADIAL_ORDER_2_DECIMAL).unwrap();
    let entries = &stencils[0].entries;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].coefficient, Coefficient::Decimal(-0.5));
    assert!(entries[1].coefficient.is_zero());
    assert_eq!(entries[2].coefficient, Coefficient::Decimal(0.5));
}

#[test]
fn conflict_names_both_documents() {
    let docs = [
        SourceDocument::new("stencil_r_2.tex", fixtures::RADIAL_ORDER_2_DECIMAL),
        SourceDocument::new("stencil_r_2_skew.tex", fixtures::RADIAL_ORDER_2_FORWARD),
    ];
    let err = build_table(&docs).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("stencil_r_2.tex"), "{message}");
    assert!(message.contains("stencil_r_2_skew.tex"), "{message}");
}

#[test]
fn malformed_document_is_attributed() {
    let docs = [
        SourceDocument::new("stencil_r_2.tex", fixtures::RADIAL_ORDER_2_DECIMAL),
        SourceDocument::new("stencil_theta_2.tex", "\\[ f' \\approx 2 f_{j+1} 3 \\]"),
    ];
    let err = build_table(&docs).unwrap_err();
    assert!(matches!(err, InputError::Malformed { .. }));
    assert_eq!(err.document(), Some("stencil_theta_2.tex"));
}

#[test]
fn quotient_notation_divides_every_term() {
    let stencils =
        parse_document("stencil_r_2.tex", fixtures::RADIAL_ORDER_2_QUOTIENT).unwrap();
    let stencil = &stencils[0];
    assert_eq!(stencil.key, key(Direction::Radial, 2));
    assert_eq!(stencil.spacing_power, 1);
    assert_eq!(
        stencil.coefficient_at(1),
        Some(Coefficient::rational(1, 2).unwrap())
    );
    assert_eq!(
        stencil.coefficient_at(-1),
        Some(Coefficient::rational(-1, 2).unwrap())
    );
}

#[test]
fn argument_notation_matches_subscript_notation() {
    let docs = [
        SourceDocument::new("stencil_radial_4.tex", fixtures::RADIAL_ORDER_4),
        SourceDocument::new("stencil_r_4_argument.tex", fixtures::RADIAL_ORDER_4_ARGUMENT),
    ];
    let table = build_table(&docs).unwrap();
    assert_eq!(table.len(), 1);
    let stencils =
        parse_document("stencil_r_4_argument.tex", fixtures::RADIAL_ORDER_4_ARGUMENT).unwrap();
    assert_eq!(stencils[0].width(), 5);
    assert_eq!(
        stencils[0].coefficient_at(2),
        Some(Coefficient::rational(-1, 12).unwrap())
    );
}

#[test]
fn trailing_sign_is_malformed() {
    let err = parse_document(
        "stencil_r_2.tex",
        "\\[ f' \\approx 0.5 f_{i+1} - 0.5 f_{i-1} - \\quad \\]",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        InputError::Malformed {
            reason: MalformedReason::CoefficientWithoutOffset { .. },
            locator: Some(_),
            ..
        }
    ));
}

#[test]
fn deeply_nested_formula_is_malformed() {
    let text = format!(
        "\\[ f' \\approx {}f_{{i}}{} \\]",
        "(".repeat(5_000),
        ")".repeat(5_000)
    );
    let err = parse_document("stencil_r_2.tex", &text).unwrap_err();
    assert!(matches!(
        err,
        InputError::Malformed {
            reason: MalformedReason::NestingTooDeep { .. },
            locator: Some(_),
            ..
        }
    ));
}

proptest! {
    #[test]
    fn arbitrary_formula_text_never_panics(body in "[-+*/()\\[\\]{}_^.0-9a-z\\\\ ]{0,60}") {
        let text = format!("\\[ f' \\approx {body} \\]");
        let _ = parse_document("stencil_r_2.tex", &text);
    }

    #[test]
    fn integer_weights_survive_extraction(
        weights in proptest::collection::vec(-50i64..50, 1..8),
    ) {
        let body: Vec<String> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{w:+} f_{{i+{i}}}"))
            .collect();
        let text = format!("\\[ f' \\approx {} \\]", body.join(" "));
        let stencils = parse_document("stencil_r_2.tex", &text).unwrap();
        let parsed: Vec<Coefficient> =
            stencils[0].entries.iter().map(|e| e.coefficient).collect();
        let expected: Vec<Coefficient> = weights.iter().map(|&w| Coefficient::integer(w)).collect();
        prop_assert_eq!(parsed, expected);
    }
}
