use fnf_sm_rs::prelude::*;
use pretty_assertions::assert_eq;

const BOPEEBO: &str = include_str!("files/bopeebo.json");
const BOPEEBO_HARD: &str = include_str!("files/bopeebo-hard.json");

fn medium() -> Vec<(Difficulty, FnfChart)> {
    vec![(Difficulty::Medium, parse_fnf(BOPEEBO).unwrap())]
}

#[test]
fn renders_single_simfile() {
    let ForwardOutput { simfile, warnings } =
        fnf_to_sm(&medium(), &ForwardConfig::default()).unwrap();
    assert_eq!(warnings, vec![]);

    let expected = "\
#TITLE:Bopeebo;
#MUSIC:Bopeebo.ogg;
#BPMS:0.000=100,8.000=150;

#NOTES:
     dance-single:
     :
     Medium:
     1:
     :
1000
0100
0010
0001
,
0000
,
2000
000M
3000
0000
0000
0000
0000
0000
,
0000
0010
0000
0000
0000
0000
0000
0000
0000
0000
0100
0000
0000
0000
0000
0000
;
";
    assert_eq!(simfile.to_string(), expected);
}

#[test]
fn double_keeps_both_sides() {
    let ForwardOutput { simfile, warnings } = fnf_to_sm(
        &medium(),
        &ForwardConfig::default().mode(ChartMode::Double).meter(9),
    )
    .unwrap();
    assert_eq!(warnings, vec![]);

    let block = simfile.block(Difficulty::Medium).unwrap();
    assert_eq!(block.mode, ChartMode::Double);
    assert_eq!(block.meter, 9);
    let rows = |index: usize| {
        block.measures[index]
            .rows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    };
    assert_eq!(rows(0), ["10000000", "01000000", "00100000", "00010000"]);
    // must-hit notes on lanes 4 and 5 move to the left side
    assert_eq!(rows(1), ["10000000", "01000000", "00000000", "00000000"]);
    assert_eq!(&rows(2)[..3], ["00002000", "0000000M", "00003000"]);
}

#[test]
fn each_difficulty_gets_a_block() {
    let charts = vec![
        (Difficulty::Medium, parse_fnf(BOPEEBO).unwrap()),
        (Difficulty::Hard, parse_fnf(BOPEEBO_HARD).unwrap()),
    ];
    let ForwardOutput { simfile, warnings } =
        fnf_to_sm(&charts, &ForwardConfig::default()).unwrap();
    assert_eq!(warnings, vec![]);
    assert_eq!(
        simfile.difficulties(),
        [Difficulty::Medium, Difficulty::Hard]
    );

    let hard = simfile.block(Difficulty::Hard).unwrap();
    assert_eq!(hard.measures.len(), 1);
    assert_eq!(
        hard.measures[0]
            .rows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["1000", "0001", "0000", "0000", "0000", "0000", "0000", "0000"]
    );
}

#[test]
fn rendered_simfile_parses_back() {
    let ForwardOutput { simfile, .. } = fnf_to_sm(&medium(), &ForwardConfig::default()).unwrap();
    let rendered = simfile.to_string();
    let parsed = parse_sm(&rendered).unwrap();
    assert!(parsed.is_clean());
    assert_eq!(parsed.simfile, simfile);
}

#[test]
fn opponent_only_chart_is_skipped() {
    let mut chart = parse_fnf(BOPEEBO).unwrap();
    for section in &mut chart.sections {
        section.notes.retain(|note| note.lane >= 4 && note.lane < 8);
    }
    let ForwardOutput { simfile, warnings } = fnf_to_sm(
        &[(Difficulty::Easy, chart)],
        &ForwardConfig::default(),
    )
    .unwrap();
    assert!(simfile.blocks.is_empty());
    assert_eq!(
        warnings,
        vec![ConvertWarning::EmptyChart {
            difficulty: Difficulty::Easy
        }]
    );
}

#[test]
fn no_charts_is_an_error() {
    assert!(matches!(
        fnf_to_sm(&[], &ForwardConfig::default()),
        Err(ConvertError::NoCharts)
    ));
}
