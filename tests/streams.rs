use std::io::Cursor;

use nq::{run, NqError, NqResult, Options, Summary};

/// Reader that fails the test if anything tries to read it.
struct Untouched;

impl std::io::Read for Untouched
{
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize>
    {
        panic!("input was read");
    }
}

impl std::io::BufRead for Untouched
{
    fn fill_buf(&mut self) -> std::io::Result<&[u8]>
    {
        panic!("input was read");
    }

    fn consume(&mut self, _amt: usize) {}
}

fn options(function: &str) -> Options
{
    Options {
        function: Some(function.to_owned()),
        ..Options::default()
    }
}

fn run_with(options: &Options, input: &str) -> (NqResult<Summary>, String)
{
    let mut out = Vec::new();
    let result = run(options, Cursor::new(input.to_owned()), &mut out);
    (result, String::from_utf8(out).expect("output is UTF-8"))
}

#[test]
fn map_doubles_numbers()
{
    let (result, out) = run_with(&options("lambda v: v * 2"), "1\n2\n3\n");
    assert_eq!(out, "2\n4\n6\n");
    assert_eq!(result.unwrap(), Summary { lines_read: 3, lines_written: 3 });
}

#[test]
fn filter_keeps_even_numbers()
{
    let filter = Options { filter: true, ..options("lambda v: v % 2 == 0") };
    let (result, out) = run_with(&filter, "1\n2\n3\n4\n");
    assert_eq!(out, "2\n4\n");
    assert_eq!(result.unwrap().lines_written, 2);
}

#[test]
fn reduce_sums_the_stream()
{
    let reduce = Options { reduce: Some("0".to_owned()), ..options("lambda acc, v: acc + v") };
    let (result, out) = run_with(&reduce, "1\n2\n3\n");
    assert_eq!(out, "6\n");
    assert_eq!(result.unwrap(), Summary { lines_read: 3, lines_written: 1 });
}

#[test]
fn raw_strings_in_and_out()
{
    let raw = Options { string_input: true, string_output: true, ..options("lambda v: v") };
    let (_, out) = run_with(&raw, "hello\n");
    assert_eq!(out, "hello\n");
}

#[test]
fn string_input_with_json_output_quotes()
{
    let raw_in = Options { string_input: true, ..options("lambda v: v.upper()") };
    let (_, out) = run_with(&raw_in, "hello\nworld\n");
    assert_eq!(out, "\"HELLO\"\n\"WORLD\"\n");
}

#[test]
fn missing_function_fails_before_reading()
{
    let mut out = Vec::new();
    let result = run(&Options::default(), Untouched, &mut out);
    assert!(matches!(result, Err(NqError::Configuration(_))));
    assert!(out.is_empty());
}

#[test]
fn reduce_and_filter_together_fail_before_reading()
{
    let both = Options {
        reduce: Some("0".to_owned()),
        filter: true,
        ..options("lambda acc, v: acc")
    };
    let mut out = Vec::new();
    match run(&both, Untouched, &mut out)
    {
        Err(NqError::Configuration(message)) => assert!(message.contains("cannot specify both")),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn invalid_seed_fails_before_reading()
{
    let reduce = Options { reduce: Some("[1,".to_owned()), ..options("lambda acc, v: acc") };
    let mut out = Vec::new();
    assert!(matches!(run(&reduce, Untouched, &mut out), Err(NqError::Configuration(_))));
}

#[test]
fn map_output_matches_input_order_and_count()
{
    let input: String = (0 .. 50).map(|n| format!("{n}\n")).collect();
    let (_, out) = run_with(&options("lambda v: [v, v * v]"), &input);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 50);
    for (n, line) in lines.iter().enumerate()
    {
        assert_eq!(*line, format!("[{n},{}]", n * n));
    }
}

#[test]
fn filter_output_is_an_ordered_subsequence_of_decoded_input()
{
    let filter = Options { filter: true, ..options("lambda v: v['keep']") };
    let input = "{\"id\": 1, \"keep\": true}\n{\"id\": 2, \"keep\": false}\n{\"id\": 3, \"keep\": 1}\n";
    let (_, out) = run_with(&filter, input);
    assert_eq!(out, "{\"id\":1,\"keep\":true}\n{\"id\":3,\"keep\":1}\n");
}

#[test]
fn shared_context_counts_across_lines()
{
    let counter = options("lambda v: (setattr(ctx, 'n', getattr(ctx, 'n', 0) + 1), [ctx.n, v])[1]");
    let (_, out) = run_with(&counter, "\"a\"\n\"b\"\n");
    assert_eq!(out, "[1,\"a\"]\n[2,\"b\"]\n");
}

#[test]
fn functional_helpers_are_the_default()
{
    let (_, out) = run_with(&options("lambda v: _.sum_by('price')(v)"), "[{\"price\": 2}, {\"price\": 3}]\n");
    assert_eq!(out, "5\n");
}

#[test]
fn not_fp_switches_to_data_first_helpers()
{
    let standard = Options { not_fp: true, ..options("lambda v: _.sum_by(v, 'price')") };
    let (_, out) = run_with(&standard, "[{\"price\": 2}, {\"price\": 3}]\n");
    assert_eq!(out, "5\n");
}

#[test]
fn reduce_into_an_object()
{
    let reduce = Options {
        reduce: Some("{}".to_owned()),
        ..options("lambda acc, v: {**acc, v['k']: acc.get(v['k'], 0) + 1}")
    };
    let (_, out) = run_with(&reduce, "{\"k\": \"a\"}\n{\"k\": \"b\"}\n{\"k\": \"a\"}\n");
    assert_eq!(out, "{\"a\":2,\"b\":1}\n");
}

#[test]
fn failure_mid_stream_keeps_earlier_output()
{
    let (result, out) = run_with(&options("lambda v: 10 // v"), "1\n0\n5\n");
    assert_eq!(out, "10\n");
    assert!(matches!(result, Err(NqError::Callable { line: 2, .. })));
}

#[test]
fn string_output_prints_python_str_of_non_strings()
{
    let raw_out = Options { string_output: true, ..options("lambda v: v") };
    let (_, out) = run_with(&raw_out, "{\"a\":[1,null,true]}\n");
    assert_eq!(out, "{'a': [1, None, True]}\n");
}

#[test]
fn deeply_nested_line_passes_through_unchanged()
{
    let line = format!("{}{}", "[".repeat(200), "]".repeat(200));
    let (result, out) = run_with(&options("lambda v: v"), &format!("{line}\n"));
    assert_eq!(out, format!("{line}\n"));
    assert_eq!(result.unwrap(), Summary { lines_read: 1, lines_written: 1 });
}

#[test]
fn deeply_nested_object_passes_through_unchanged()
{
    let line = format!("{}1{}", "{\"k\":".repeat(300), "}".repeat(300));
    let (_, out) = run_with(&options("lambda v: v"), &format!("{line}\n"));
    assert_eq!(out, format!("{line}\n"));
}

#[test]
fn wide_integers_keep_plain_digits()
{
    let (_, out) = run_with(&options("lambda v: v ** 2"), "4294967296\n");
    assert_eq!(out, "18446744073709552000\n");
}

#[test]
fn failing_filter_truthiness_names_the_line()
{
    let filter = Options {
        filter: true,
        ..options("lambda v: type('Unsure', (), {'__bool__': lambda self: 1 / 0})() if v == 2 else True")
    };
    let (result, out) = run_with(&filter, "1\n2\n3\n");
    assert_eq!(out, "1\n");
    assert!(matches!(result, Err(NqError::Callable { line: 2, .. })));
}

#[test]
fn invalid_utf8_names_the_line()
{
    let mut out = Vec::new();
    let result = run(&options("lambda v: v"), Cursor::new(b"1\n\"\xff\"\n".to_vec()), &mut out);
    assert_eq!(out, b"1\n");
    assert!(matches!(result, Err(NqError::Read { line: 2, .. })));
}
