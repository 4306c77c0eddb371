use permseq::commands::{run, Command, CommandError, Program};
use permseq::TreapSeq;

const EXAMPLE: &str = "\
5
1 2 3 4 5
8
1 0 4
6 0 4
1 3 4
2 10 2
3 0
4 7 0 1
5 -2 0 4
1 0 4
";

#[test]
fn test_parse() {
    let program = Program::parse("3\n4 -5 6\n2\n1 0 2\n7 1 2\n").unwrap();
    assert_eq!(program.initial, vec![4, -5, 6]);
    assert_eq!(
        program.commands,
        vec![
            Command::Sum { l: 0, r: 2 },
            Command::PrevPermutation { l: 1, r: 2 },
        ]
    );
}

#[test]
fn test_run_example() {
    let program = Program::parse(EXAMPLE).unwrap();
    let output = run::<TreapSeq>(&program).unwrap();
    assert_eq!(output.sums, vec![15, 9, 16]);
    assert_eq!(output.sequence, vec![5, 5, 1, 3, 2]);
    let mut buf = Vec::new();
    output.write_to(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "15\n9\n16\n5 5 1 3 2 \n");
}

#[test]
fn test_run_from_empty() {
    let program = Program::parse("0\n2\n2 42 0\n2 -1 1\n").unwrap();
    let output = run::<TreapSeq>(&program).unwrap();
    assert!(output.sums.is_empty());
    assert_eq!(output.sequence, vec![42, -1]);
}

#[test]
fn test_parse_unknown_opcode() {
    let err = Program::parse("1\n5\n1\n9 0 0\n").unwrap_err();
    assert!(matches!(err, CommandError::UnknownOpcode(9)));
}

#[test]
fn test_parse_truncated() {
    let err = Program::parse("3\n1 2\n").unwrap_err();
    assert!(matches!(err, CommandError::UnexpectedEof));
}

#[test]
fn test_parse_bad_token() {
    let err = Program::parse("1\nfoo\n0\n").unwrap_err();
    assert!(matches!(err, CommandError::BadToken { .. }));
}

#[test]
fn test_run_rejects_bad_range() {
    let program = Program::parse("2\n1 2\n1\n1 0 5\n").unwrap();
    let err = run::<TreapSeq>(&program).unwrap_err();
    assert!(matches!(
        err,
        CommandError::RangeOutOfRange { l: 0, r: 5, len: 2 }
    ));
}

#[test]
fn test_run_rejects_bad_position() {
    let program = Program::parse("1\n7\n1\n2 0 3\n").unwrap();
    let err = run::<TreapSeq>(&program).unwrap_err();
    assert!(matches!(err, CommandError::PosOutOfRange { pos: 3, len: 1 }));
}
