use rstest::*;

use crate::{
    prelude::{Constellation, InUseReport, InViewStatus, NmeaParser, SentenceParser},
    tests::{init_logger, record, sentence},
};

#[test]
fn multi_part_reassembly() {
    init_logger();

    let mut parser = NmeaParser::default();

    let chunks = [
        sentence("GLGSV,3,1,10,65,,,,66,,,,71,,,20,72,,,28"),
        sentence("GLGSV,3,2,10,73,,,,74,,,,75,,,33,81,,,"),
        sentence("GLGSV,3,3,10,82,,,,83,,,"),
    ];

    assert_eq!(
        parser.parse_in_view(&chunks[0]),
        InViewStatus::PartiallyParsed {
            system: Constellation::Glonass,
            received: 4,
        }
    );
    assert!(parser.is_assembling());

    assert_eq!(
        parser.parse_in_view(&chunks[1]),
        InViewStatus::PartiallyParsed {
            system: Constellation::Glonass,
            received: 8,
        }
    );

    match parser.parse_in_view(&chunks[2]) {
        InViewStatus::FullyParsed { system, satellites } => {
            assert_eq!(system, Constellation::Glonass);
            assert_eq!(satellites.len(), 10);

            let ids = satellites.iter().map(|sat| sat.id).collect::<Vec<_>>();
            assert_eq!(ids, vec![65, 66, 71, 72, 73, 74, 75, 81, 82, 83]);

            assert_eq!(satellites[2], record(Constellation::Glonass, 71, Some(20)));
            assert_eq!(satellites[6], record(Constellation::Glonass, 75, Some(33)));
        },
        status => panic!("unexpected status: {:?}", status),
    }

    assert!(!parser.is_assembling());
}

#[test]
fn satellite_attitude() {
    let mut parser = NmeaParser::default();
    let line = sentence("GAGSV,1,1,02,05,45,120,38,09,12,310,");

    match parser.parse_in_view(&line) {
        InViewStatus::FullyParsed { system, satellites } => {
            assert_eq!(system, Constellation::Galileo);
            assert_eq!(
                satellites,
                vec![
                    record(Constellation::Galileo, 5, Some(38))
                        .with_elevation(45.0)
                        .with_azimuth(120.0),
                    record(Constellation::Galileo, 9, None)
                        .with_elevation(12.0)
                        .with_azimuth(310.0),
                ]
            );
        },
        status => panic!("unexpected status: {:?}", status),
    }
}

#[test]
fn empty_description() {
    let mut parser = NmeaParser::default();
    let line = sentence("GPGSV,1,1,0,,,,,,,,,,,,,,,,");

    assert_eq!(
        parser.parse_in_view(&line),
        InViewStatus::FullyParsed {
            system: Constellation::GPS,
            satellites: vec![],
        }
    );
}

#[test]
fn out_of_sequence_chunks() {
    init_logger();

    let mut parser = NmeaParser::default();

    let first = sentence("GPGSV,3,1,9,05,,,22,07,,,,08,,,,13,,,18");
    let third = sentence("GPGSV,3,3,9,21,,,");
    let glonass = sentence("GLGSV,3,2,9,65,,,,66,,,,71,,,20,72,,,28");

    assert!(matches!(
        parser.parse_in_view(&first),
        InViewStatus::PartiallyParsed { .. }
    ));

    // missing chunk: the whole group is dropped
    assert_eq!(parser.parse_in_view(&third), InViewStatus::NotRecognized);
    assert!(!parser.is_assembling());

    assert!(matches!(
        parser.parse_in_view(&first),
        InViewStatus::PartiallyParsed { .. }
    ));

    // interleaved constellation
    assert_eq!(parser.parse_in_view(&glonass), InViewStatus::NotRecognized);
    assert!(!parser.is_assembling());

    // a new group always restarts the assembly
    assert!(matches!(
        parser.parse_in_view(&first),
        InViewStatus::PartiallyParsed { .. }
    ));
    let single = sentence("GPGSV,1,1,1,05,,,22");
    assert!(matches!(
        parser.parse_in_view(&single),
        InViewStatus::FullyParsed { .. }
    ));
}

#[rstest]
#[case("GPGSA,A,3,05,13,,,,,,,,,,,50.95,50.94,1.00", Constellation::GPS, vec![5, 13])]
#[case("GLGSA,A,3,71,72,,,,,,,,,,,1.0,1.0,1.0", Constellation::Glonass, vec![71, 72])]
#[case("BDGSA,A,3,203,204,,,,,,,,,,,1.0,1.0,1.0", Constellation::BeiDou, vec![203, 204])]
#[case("GBGSA,A,3,203,,,,,,,,,,,,1.0,1.0,1.0", Constellation::BeiDou, vec![203])]
#[case("GNGSA,A,3,71,72,,,,,,,,,,,50.95,50.94,1.00", Constellation::Glonass, vec![71, 72])]
#[case("GNGSA,A,3,05,13,15,,,,,,,,,,50.95,50.94,1.00", Constellation::GPS, vec![5, 13, 15])]
#[case("GNGSA,A,3,203,204,207,,,,,,,,,,50.95,50.94,1.00", Constellation::BeiDou, vec![203, 204, 207])]
#[case("GNGSA,A,3,201,203,,,,,,,,,,,50.95,50.94,1.00", Constellation::BeiDou, vec![201, 203])]
#[case("GNGSA,A,3,202,,,,,,,,,,,,50.95,50.94,1.00", Constellation::BeiDou, vec![202])]
#[case("GNGSA,A,3,194,195,,,,,,,,,,,1.0,1.0,1.0", Constellation::QZSS, vec![194, 195])]
#[case("GNGSA,A,3,201,202,,,,,,,,,,,1.0,1.0,1.0,5", Constellation::QZSS, vec![201, 202])]
#[case("GNGSA,A,3,05,09,,,,,,,,,,,1.5,0.9,1.2,3", Constellation::Galileo, vec![5, 9])]
#[case("GNGSA,A,1,,,,,,,,,,,,,99.99,99.99,99.99", Constellation::Mixed, vec![])]
#[case("GPGSA,A,3,05,xx,00,13,,,,,,,,,50.95,50.94,1.00", Constellation::GPS, vec![5, 13])]
fn in_use_parsing(#[case] content: &str, #[case] system: Constellation, #[case] ids: Vec<u16>) {
    let mut parser = NmeaParser::default();
    let line = sentence(content);

    assert_eq!(
        parser.parse_in_use(&line),
        Some(InUseReport { system, ids }),
        "failed to parse \"{}\"",
        content
    );

    // GSA never describes satellites in view
    assert_eq!(parser.parse_in_view(&line), InViewStatus::NotRecognized);
}

#[rstest]
#[case("GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,")]
#[case("GPGSV,1,1,4,05,,,25,07,,,,08,,,,13,,,36")]
#[case("XXGSA,A,3,05,13,,,,,,,,,,,50.95,50.94,1.00")]
#[case("GPGSAX,A,3,05,13,,,,,,,,,,,50.95,50.94,1.00")]
fn in_use_not_recognized(#[case] content: &str) {
    let mut parser = NmeaParser::default();
    assert!(parser.parse_in_use(&sentence(content)).is_none());
}

#[rstest]
#[case("GPGSV,0,1,4,05,,,25")]
#[case("GPGSV,1,2,4,05,,,25")]
#[case("GPGSV,,1,4,05,,,25")]
#[case("XXGSV,1,1,4,05,,,25")]
#[case("GPGSA,A,3,05,13,,,,,,,,,,,50.95,50.94,1.00")]
fn in_view_not_recognized(#[case] content: &str) {
    let mut parser = NmeaParser::default();
    assert_eq!(
        parser.parse_in_view(&sentence(content)),
        InViewStatus::NotRecognized
    );
}

#[test]
fn corrupt_checksum() {
    let mut parser = NmeaParser::default();
    let mut line = sentence("GPGSV,1,1,4,05,,,25,07,,,,08,,,,13,,,36");

    // corrupt one identifier
    let position = line.iter().position(|c| *c == b'7').unwrap();
    line[position] = b'6';

    assert_eq!(parser.parse_in_view(&line), InViewStatus::NotRecognized);
}
