/////////////////////////////TESTS////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::numerical::Heat1D::heat_errors::HeatError;
    use crate::Utils::task_parser::{
        Value, filter_comments, parse_entry, parse_identifier, parse_section, parse_task,
        parse_task_file, parse_value, parse_value_list,
    };
    use std::io::Write;

    #[test]
    fn test_parse_identifier() {
        let (remaining, title) = parse_identifier("physics\n alpha: 0.1").unwrap();
        assert_eq!(title, "physics");
        assert_eq!(remaining, "\n alpha: 0.1");

        let (remaining, key) = parse_identifier("num_cells: 5").unwrap();
        assert_eq!(key, "num_cells");
        assert_eq!(remaining, ": 5");

        assert!(parse_identifier("1abc").is_err());
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("123, next").unwrap();
        assert_eq!(value, Value::Integer(123));
        assert_eq!(remaining, ", next");

        let (_, value) = parse_value("1e-3").unwrap();
        assert_eq!(value, Value::Float(1e-3));

        let (_, value) = parse_value("true").unwrap();
        assert_eq!(value, Value::Boolean(true));

        let (_, value) = parse_value("results/run_1").unwrap();
        assert_eq!(value, Value::String("results/run_1".to_string()));

        let (_, value) = parse_value("-7").unwrap();
        assert_eq!(value.as_float(), Some(-7.0));
    }

    #[test]
    fn test_parse_value_list() {
        let (remaining, values) = parse_value_list("fixed, 0.0 ,100\nnext").unwrap();
        assert_eq!(
            values,
            vec![
                Value::String("fixed".to_string()),
                Value::Float(0.0),
                Value::Integer(100)
            ]
        );
        assert_eq!(remaining, "\nnext");
        assert!(parse_value_list("\n dt: 1").is_err());
    }

    #[test]
    fn test_parse_entry() {
        let (remaining, (key, values)) = parse_entry("alpha : 0.02\n  dt: 0.1").unwrap();
        assert_eq!(key, "alpha");
        assert_eq!(values, vec![Value::Float(0.02)]);
        assert_eq!(remaining, "dt: 0.1");
    }

    #[test]
    fn test_parse_section_stops_at_next_title() {
        let input = "time\n  dt: 0.01\n  total_time: 1\nsolver\n  backend: faer";
        let (remaining, section) = parse_section(input).unwrap();
        assert_eq!(section.title, "time");
        assert_eq!(section.entries.len(), 2);
        assert_eq!(section.get("total_time"), Some(&[Value::Integer(1)][..]));
        assert!(remaining.starts_with("solver"));
    }

    #[test]
    fn test_filter_comments() {
        let input = "// header\ngrid\n# note\n  num_cells: 3\n% x\n; y\n\n";
        assert_eq!(filter_comments(input), "grid\n  num_cells: 3");
    }

    #[test]
    fn test_parse_task_document() {
        let input = r#"
            // heat run
            grid
              num_cells: 99
            physics
              alpha: 0.01
              boundary: insulated
            time
              dt: 0.001
              total_time: 0.5
            output
              prefix: results/band
              retain_history: false
        "#;
        let doc = parse_task(input).unwrap();
        assert_eq!(doc.sections.len(), 4);
        let grid = doc.section("grid").unwrap();
        assert_eq!(grid.get("num_cells").unwrap()[0].as_integer(), Some(99));
        let physics = doc.section("physics").unwrap();
        assert_eq!(physics.get("boundary").unwrap()[0].as_str(), Some("insulated"));
        let output = doc.section("output").unwrap();
        assert_eq!(output.get("retain_history").unwrap()[0].as_boolean(), Some(false));
        assert!(doc.section("solver").is_none());
    }

    #[test]
    fn test_same_line_section() {
        let doc = parse_task("grid num_cells: 5").unwrap();
        assert_eq!(
            doc.section("grid").unwrap().get("num_cells"),
            Some(&[Value::Integer(5)][..])
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = parse_task("  \n// nothing\n").unwrap();
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_task("grid\n num_cells 5").is_err());
        assert!(parse_task("grid\n num_cells: 5\n 42").is_err());
        let err = parse_task("grid\n num_cells: 5\ngrid\n num_cells: 6").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_repeated_key_rejected() {
        let err = parse_task("time\n dt: 0.1\n dt: 0.5").unwrap_err();
        assert!(matches!(err, HeatError::TaskParse(_)));
        assert!(err.to_string().contains("`dt`"));
        // the same key in different sections is fine
        assert!(parse_task("grid\n name: a\nphysics\n name: b").is_ok());
    }

    #[test]
    fn test_parse_task_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "physics\n  alpha: 0.5").unwrap();
        let doc = parse_task_file(file.path()).unwrap();
        assert_eq!(
            doc.section("physics").unwrap().get("alpha").unwrap()[0].as_float(),
            Some(0.5)
        );
        assert!(parse_task_file("no/such/task.txt").is_err());
    }
}
