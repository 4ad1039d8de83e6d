//! End-to-end tests of the public pipeline: source text → indexed term →
//! timeline → candidate layouts → chosen layout.

use codespan_reporting::term::termcolor::NoColor;
use scoped_arena::Scope;

use plait::core::matrix::Matrix;
use plait::core::timeline::{linearize, Timeline};
use plait::core::{layout, rate, ScopeArg};
use plait::env::TermId;
use plait::files::Files;
use plait::surface::{self, indexing};
use plait::{Driver, Status};

fn lower(source: &str, inputs: &[&str]) -> (Timeline, TermId, Vec<ScopeArg>) {
    let scope = Scope::new();
    let mut files = Files::new();
    let file_id = files.add("<test>".to_owned(), source.to_owned());
    let term = surface::parse_term(&scope, file_id, source).unwrap();

    let mut context = indexing::Context::new(&scope);
    for input in inputs {
        context
            .declare_input(plait::symbol::Symbol::intern(input))
            .unwrap();
    }
    let term = context.index(term).unwrap();
    let seeds = context.inputs().to_vec();
    let (timeline, output) = linearize(term);
    (timeline, output, seeds)
}

#[test]
fn closed_terms_plan_without_inputs() {
    let (timeline, output, seeds) = lower(r"\f x. f x", &[]);
    timeline.check_scoped(&[]).unwrap();

    let best = rate::best(layout::candidates(&timeline, &seeds, output))
        .unwrap()
        .expect("at least one candidate");
    assert_eq!(rate::cost(&best), 3);
}

#[test]
fn declared_inputs_drive_the_top_level_layout() {
    // Applying a church numeral to succ and zero, with all three names
    // supplied from outside.
    let (timeline, output, seeds) = lower("succ (num succ zero)", &["num", "succ", "zero"]);

    let input_ids: Vec<TermId> = seeds.iter().map(|seed| seed.id).collect();
    timeline.check_scoped(&input_ids).unwrap();
    assert_eq!(timeline.steps().len(), 3);

    let best = rate::best(layout::candidates(&timeline, &seeds, output))
        .unwrap()
        .expect("at least one candidate");

    // All three input tracks appear in the first column.
    let matrix = Matrix::of(&best);
    for id in input_ids {
        assert!(matrix.is_live(id, 0));
    }
    assert!(matrix.contains(output));
}

#[test]
fn every_candidate_grid_is_collision_free() {
    let (timeline, output, seeds) = lower(r"\a b c. c (a b)", &[]);

    for candidate in layout::candidates(&timeline, &seeds, output) {
        let candidate = candidate.unwrap();
        let matrix = Matrix::of(&candidate);
        for time in 0..matrix.duration() {
            let mut seen = Vec::new();
            for track in 0..matrix.width() {
                if let Some(id) = matrix.cell(time, track).unwrap().id() {
                    assert!(!seen.contains(&id));
                    seen.push(id);
                }
            }
        }
    }
}

#[test]
fn rerunning_the_pipeline_is_deterministic() {
    let source = r"\x. x (\y. x y)";
    let first = lower(source, &[]);
    let second = lower(source, &[]);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);

    let best = |&(ref timeline, output, ref seeds): &(Timeline, TermId, Vec<ScopeArg>)| {
        rate::best(layout::candidates(timeline, seeds, output))
            .unwrap()
            .expect("at least one candidate")
    };
    assert_eq!(best(&first), best(&second));
}

#[test]
fn driver_plans_valid_terms() {
    let mut driver = Driver::new();
    driver.set_diagnostic_writer(NoColor::new(Vec::new()));
    driver.set_emit_writer(NoColor::new(Vec::new()));

    let file_id = driver.load_source_string("<test>".to_owned(), r"\f x. f x".to_owned());
    assert!(matches!(driver.plan_and_emit_term(file_id), Status::Ok));
}

#[test]
fn driver_rejects_unbound_variables() {
    let mut driver = Driver::new();
    driver.set_diagnostic_writer(NoColor::new(Vec::new()));
    driver.set_emit_writer(NoColor::new(Vec::new()));

    let file_id = driver.load_source_string("<test>".to_owned(), r"\x. y".to_owned());
    assert!(matches!(driver.plan_and_emit_term(file_id), Status::Error));
}
