use std::fs;
use std::path::{Path, PathBuf};

use symprop_attach::{attach_properties, AttachError, AttachOptions, TextEncoding};
use symprop_sexpr::library;

const LIB: &str = r#"(kicad_symbol_lib
  (version 20241209)
  (generator "kicad_symbol_editor")
  (symbol "U1"
    (property "Reference" "U"
      (at 0 0 0)
    )
    (pin passive line (at 0 0 0) (length 2.54) (name "1") (number "1"))
  )
  (symbol "R1"
    (property "Reference" "R"
      (at 0 0 0)
    )
  )
)
"#;

fn write_lib(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("lib.kicad_sym");
    fs::write(&path, content).unwrap();
    path
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_attach_adds_property_to_every_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);

    let stats = attach_properties(
        &input,
        &names(&["SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.symbols_processed, 2);
    assert_eq!(stats.properties_added, 2);
    assert_eq!(stats.properties_skipped, 0);
    assert_eq!(stats.added_symbols, vec!["U1", "R1"]);

    let updated = fs::read_to_string(&input).unwrap();
    assert_eq!(updated.matches("(property \"SzlcscCode\" \"\"").count(), 2);
    assert_eq!(
        updated.matches('(').count(),
        updated.matches(')').count()
    );

    // the patched output still parses, and both symbols now carry the property
    let root = symprop_sexpr::parse(&updated).unwrap();
    for (form, _) in library::symbols(&root) {
        assert!(library::has_property(form, "SzlcscCode"));
    }
}

#[test]
fn test_attach_creates_numbered_backup_of_original() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);

    attach_properties(
        &input,
        &names(&["SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    let backup = dir.path().join("lib.kicad_sym.orig");
    assert_eq!(fs::read_to_string(&backup).unwrap(), LIB);

    // a second run backs up to .orig.1 rather than clobbering .orig
    attach_properties(&input, &names(&["Other"]), "", &AttachOptions::default()).unwrap();
    assert!(dir.path().join("lib.kicad_sym.orig.1").exists());
    assert_eq!(fs::read_to_string(&backup).unwrap(), LIB);
}

#[test]
fn test_second_run_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);
    let props = names(&["SzlcscCode"]);

    attach_properties(&input, &props, "", &AttachOptions::default()).unwrap();
    let after_first = fs::read_to_string(&input).unwrap();

    let stats = attach_properties(&input, &props, "", &AttachOptions::default()).unwrap();
    assert_eq!(stats.properties_added, 0);
    assert_eq!(stats.properties_skipped, stats.symbols_processed);
    assert_eq!(fs::read_to_string(&input).unwrap(), after_first);
}

#[test]
fn test_existing_property_is_skipped_and_text_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);

    let stats = attach_properties(
        &input,
        &names(&["Reference"]),
        "X",
        &AttachOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.properties_added, 0);
    assert_eq!(stats.properties_skipped, 2);
    assert_eq!(stats.skipped_symbols, vec!["U1", "R1"]);
    assert_eq!(fs::read_to_string(&input).unwrap(), LIB);
}

#[test]
fn test_multi_property_independence() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);

    // "Reference" pre-exists on both symbols, "SzlcscCode" on neither
    let stats = attach_properties(
        &input,
        &names(&["Reference", "SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.symbols_processed, 2);
    assert_eq!(stats.properties_added, 2);
    assert_eq!(stats.properties_skipped, 2);

    let updated = fs::read_to_string(&input).unwrap();
    assert_eq!(updated.matches("(property \"SzlcscCode\"").count(), 2);
    assert_eq!(updated.matches("(property \"Reference\"").count(), 2);
}

#[test]
fn test_dry_run_leaves_filesystem_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);
    let options = AttachOptions {
        output: Some(dir.path().join("out.kicad_sym")),
        dry_run: true,
        encoding: TextEncoding::utf8(),
    };

    let stats = attach_properties(&input, &names(&["SzlcscCode"]), "", &options).unwrap();

    assert_eq!(stats.properties_added, 2);
    assert_eq!(fs::read_to_string(&input).unwrap(), LIB);
    assert!(!dir.path().join("out.kicad_sym").exists());
    assert!(!dir.path().join("lib.kicad_sym.orig").exists());
}

#[test]
fn test_explicit_output_path_keeps_input_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), LIB);
    let output = dir.path().join("patched/out.kicad_sym");
    let options = AttachOptions {
        output: Some(output.clone()),
        ..AttachOptions::default()
    };

    attach_properties(&input, &names(&["SzlcscCode"]), "C123", &options).unwrap();

    // intermediate directories are created, input is untouched, backup exists
    assert!(output.exists());
    assert_eq!(fs::read_to_string(&input).unwrap(), LIB);
    assert!(dir.path().join("lib.kicad_sym.orig").exists());
    assert!(fs::read_to_string(&output)
        .unwrap()
        .contains("(property \"SzlcscCode\" \"C123\""));
}

#[test]
fn test_crlf_input_stays_crlf() {
    let dir = tempfile::tempdir().unwrap();
    let crlf = LIB.replace('\n', "\r\n");
    let input = write_lib(dir.path(), &crlf);

    attach_properties(
        &input,
        &names(&["SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    let updated = fs::read_to_string(&input).unwrap();
    assert_eq!(
        updated.matches('\n').count(),
        updated.matches("\r\n").count()
    );
}

#[test]
fn test_concrete_single_symbol_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(
        dir.path(),
        r#"(kicad_symbol_lib (symbol "U1" (property "Ref" "U")))"#,
    );

    let stats = attach_properties(
        &input,
        &names(&["SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.symbols_processed, 1);
    assert_eq!(stats.properties_added, 1);
    assert_eq!(stats.properties_skipped, 0);

    let updated = fs::read_to_string(&input).unwrap();
    assert_eq!(updated.matches("(property \"SzlcscCode\" \"\"").count(), 1);
    // the new block precedes U1's closing paren
    let root = symprop_sexpr::parse(&updated).unwrap();
    let (u1, _) = library::symbols(&root)[0];
    assert!(library::has_property(u1, "SzlcscCode"));
    assert!(library::has_property(u1, "Ref"));
}

#[test]
fn test_unnamed_symbol_is_counted_but_not_patched() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), "(kicad_symbol_lib\n  (symbol\n  )\n)\n");

    let stats = attach_properties(
        &input,
        &names(&["SzlcscCode"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.symbols_processed, 1);
    assert_eq!(stats.properties_added, 1);
    assert_eq!(stats.added_symbols, vec!["<unnamed>"]);
    // nothing to locate textually: the file gains no property block
    assert_eq!(
        fs::read_to_string(&input).unwrap(),
        "(kicad_symbol_lib\n  (symbol\n  )\n)\n"
    );
}

#[test]
fn test_missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = attach_properties(
        &dir.path().join("nope.kicad_sym"),
        &names(&["P"]),
        "",
        &AttachOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AttachError::Io { .. }));
}

#[test]
fn test_unbalanced_input_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_lib(dir.path(), "(kicad_symbol_lib (symbol \"U1\"");

    let err = attach_properties(&input, &names(&["P"]), "", &AttachOptions::default()).unwrap_err();
    assert!(matches!(err, AttachError::Parse(_)));
    // parse failure aborts before the backup step
    assert!(!dir.path().join("lib.kicad_sym.orig").exists());
}

#[test]
fn test_invalid_utf8_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lib.kicad_sym");
    fs::write(&input, [0x28, 0xff, 0xfe, 0x29]).unwrap();

    let err = attach_properties(&input, &names(&["P"]), "", &AttachOptions::default()).unwrap_err();
    assert!(matches!(err, AttachError::Decode { .. }));
}
