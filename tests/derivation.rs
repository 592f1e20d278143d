//! Tests for the derivation registry and the built-in derivations.
mod common;
use common::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use symfs::derivation::financials::{FROM_STATEMENT, FromStatement, StatementParameters};
use symfs::derivation::generic_values::{FIXED_GROUPING, FixedGrouping, FixedGroupingParameters};
use symfs::prelude::*;
use symfs::record::ext::{FinancialStatement, FinancialStatementDate, GenericValues, Media};

fn statement(institution: &str, account: &str, ymd: (&str, &str, &str)) -> FinancialStatement {
    FinancialStatement {
        institution: institution.to_string(),
        account: account.to_string(),
        date: FinancialStatementDate {
            year: ymd.0.to_string(),
            month: ymd.1.to_string(),
            day: ymd.2.to_string(),
        },
    }
}

fn from_statement(additional_formats: &[&str]) -> FromStatement {
    FromStatement::new(StatementParameters {
        additional_formats: additional_formats.iter().map(|f| f.to_string()).collect(),
    })
    .expect("Failed to build derivation")
}

fn fixed_grouping(num_groups: u32, per_group: u32) -> FixedGrouping {
    FixedGrouping::new(FixedGroupingParameters {
        num_groups,
        per_group,
        ..Default::default()
    })
}

fn collect_numbers(grouping: &mut FixedGrouping, iterations: usize) -> Vec<u32> {
    (0..iterations)
        .flat_map(|_| grouping.values().numbers)
        .collect()
}

// --- Registry ---

#[test]
fn test_builtin_derivations_are_registered() {
    let registry = DerivationRegistry::with_builtin_derivations();
    assert_eq!(registry.names(), vec![FROM_STATEMENT, FIXED_GROUPING]);
    assert!(registry.contains("financials.from_statement"));
    assert!(DerivationRegistry::new().names().is_empty());
}

#[test]
fn test_unknown_derivation() {
    let registry = DerivationRegistry::with_builtin_derivations();
    let result = registry.resolve("financials.does_not_exist", &serde_json::Value::Null);
    assert!(matches!(
        result,
        Err(DerivationError::UnknownDerivation(ref name)) if name == "financials.does_not_exist"
    ));
}

#[test]
fn test_invalid_parameters() {
    let registry = DerivationRegistry::with_builtin_derivations();
    let result = registry.resolve(FIXED_GROUPING, &json!({ "num_groups": "ten" }));
    assert!(matches!(
        result,
        Err(DerivationError::InvalidParameters { ref name, .. }) if name == FIXED_GROUPING
    ));
}

#[test]
fn test_malformed_statement_parameters() {
    let registry = DerivationRegistry::with_builtin_derivations();
    let result = registry.resolve(FROM_STATEMENT, &json!({ "additional_formats": "%Y.pdf" }));
    assert!(matches!(result, Err(DerivationError::InvalidParameters { .. })));
}

#[test]
fn test_format_special_characters_are_literal() {
    let derivation = from_statement(&["(%Y) [%m].pdf"]);
    assert_eq!(
        derivation
            .statement(Path::new("/bank/joint/(2019) [11].pdf"))
            .unwrap(),
        statement("bank", "joint", ("2019", "11", "01"))
    );
}

fn title_from_name(
    path: &Path,
    parameters: &serde_json::Value,
) -> std::result::Result<AnyRecord, DerivationError> {
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| DerivationError::Failed {
            path: path.to_path_buf(),
            message: "no file name".to_string(),
        })?;
    let kind = parameters["kind"].as_str().unwrap_or("unknown");
    Ok(AnyRecord::pack(&Media {
        title: title.to_string(),
        kind: kind.to_string(),
        ..Default::default()
    })?)
}

#[test]
fn test_register_fn_receives_parameters() {
    let mut registry = DerivationRegistry::new();
    registry.register_fn("media.title_from_name", title_from_name);

    let mut derivation = registry
        .resolve("media.title_from_name", &json!({ "kind": "album" }))
        .unwrap();
    let media: Media = derivation
        .derive(Path::new("/music/Blue Train.flac"))
        .unwrap()
        .unpack()
        .unwrap();
    assert_eq!(media.title, "Blue Train");
    assert_eq!(media.kind, "album");
}

// --- financials.from_statement ---

#[test]
fn test_built_in_statement_formats() {
    let cases = [
        (
            "/home/path/to/Ally/consolidated/Sep 2021 Ally Bank Statement.pdf",
            statement("Ally", "consolidated", ("2021", "09", "01")),
        ),
        (
            "/home/path/to/Chase/credit-card/20211002-statements-1234-.pdf",
            statement("Chase", "credit-card", ("2021", "10", "02")),
        ),
        (
            "/home/path/to/Discover/it-card/Discover-Statement-20211203-1234.pdf",
            statement("Discover", "it-card", ("2021", "12", "03")),
        ),
        (
            "/to/ETrade/brokerage/Brokerage Statement - XXXX1234 - 202006.pdf",
            statement("ETrade", "brokerage", ("2020", "06", "01")),
        ),
        (
            "/Fidelity/Individual/Statement07312021.pdf",
            statement("Fidelity", "Individual", ("2021", "07", "31")),
        ),
        (
            "/path/to/Marcus/OnlineSavings/STMTCMB100_20190301_1234_LName_123456_654321.pdf",
            statement("Marcus", "OnlineSavings", ("2019", "03", "01")),
        ),
        (
            "/path/to/Schwab/IRA/BrokerageStatement0331181234.pdf",
            statement("Schwab", "IRA", ("2018", "03", "31")),
        ),
        (
            "/path/to/Schwab/investor-checking/BankStatement0131204321.pdf",
            statement("Schwab", "investor-checking", ("2020", "01", "31")),
        ),
        (
            "/path/to/Schwab/portfolio/AccountStatement033121.pdf",
            statement("Schwab", "portfolio", ("2021", "03", "31")),
        ),
        (
            "/path/Wealthfront/robo/STATEMENT_2020-05_abcd1234_2020-06-01T10_41_04.123-45_67.pdf",
            statement("Wealthfront", "robo", ("2020", "05", "01")),
        ),
        (
            "/path/Wealthfront/checking/GREEN_DOT_STATEMENT_2020-08_1234abcd_2020-08-09T08_00_14.654-32_10.pdf",
            statement("Wealthfront", "checking", ("2020", "08", "01")),
        ),
        (
            "/path/WellsFargo/account/101421 WellsFargo.pdf",
            statement("WellsFargo", "account", ("2021", "10", "14")),
        ),
        (
            "/path/Paypal/pay/statement-Apr-2020.pdf",
            statement("Paypal", "pay", ("2020", "04", "01")),
        ),
    ];

    let derivation = from_statement(&[]);
    for (path, expected) in cases {
        let actual = derivation
            .statement(Path::new(path))
            .unwrap_or_else(|e| panic!("{}: {}", path, e));
        assert_eq!(actual, expected, "{}", path);
    }
}

#[test]
fn test_additional_statement_formats() {
    let path = Path::new("/path/to/something/account-id/abcd-2021-xyz-02-xyz02.pdf");
    let expected = statement("something", "account-id", ("2021", "02", "02"));
    assert_eq!(
        from_statement(&["abcd-%Y-xyz-%m-xyz%d.pdf"]).statement(path).unwrap(),
        expected
    );
    assert_eq!(
        from_statement(&["%Y-%m-%d.pdf", "abcd-%Y-xyz-%m-xyz%d.pdf"])
            .statement(path)
            .unwrap(),
        expected
    );

    let formats = ["%Y-%m-%d.pdf", "abcd-%Y-xyz-%m-xyz%d.pdf", "%Y-%m.pdf"];
    assert_eq!(
        from_statement(&formats)
            .statement(Path::new("/path/to/something/account-id/2020-09.pdf"))
            .unwrap(),
        statement("something", "account-id", ("2020", "09", "01"))
    );
    // Built-in formats still apply after the additional ones.
    assert_eq!(
        from_statement(&formats)
            .statement(Path::new(
                "/path/to/Marcus/OnlineSavings/STMTCMB100_20190301_1234_LName_123456_654321.pdf"
            ))
            .unwrap(),
        statement("Marcus", "OnlineSavings", ("2019", "03", "01"))
    );
}

#[test]
fn test_month_name_formats() {
    let derivation = from_statement(&["%B %y.pdf"]);
    assert_eq!(
        derivation
            .statement(Path::new("/bank/joint/February 22.pdf"))
            .unwrap(),
        statement("bank", "joint", ("2022", "02", "01"))
    );
}

#[test]
fn test_unparsable_statement() {
    let mut derivation = from_statement(&[]);
    let err = derivation
        .derive(Path::new("/something/something.pdf"))
        .unwrap_err();
    assert!(matches!(err, DerivationError::UnparsableDate(_)));
    assert!(err.to_string().starts_with("Unable to parse date from"));
}

#[test]
fn test_invalid_calendar_date_is_unparsable() {
    let derivation = from_statement(&[]);
    assert!(derivation
        .statement(Path::new("/Chase/card/20210231-statements-1234-.pdf"))
        .is_err());
}

#[test]
fn test_from_statement_packs_record() {
    let mut derivation = from_statement(&[]);
    let any = derivation
        .derive(Path::new("/Chase/credit-card/20211002-statements-1234-.pdf"))
        .unwrap();
    assert_eq!(any.type_name, "symfs.ext.FinancialStatement");
    assert_eq!(
        any.unpack::<FinancialStatement>().unwrap(),
        statement("Chase", "credit-card", ("2021", "10", "02"))
    );
}

// --- generic_values.fixed_grouping ---

#[test]
fn test_fixed_grouping_rotates() {
    assert_eq!(collect_numbers(&mut fixed_grouping(0, 0), 1), vec![0]);
    assert_eq!(
        collect_numbers(&mut fixed_grouping(0, 0), 6),
        vec![0, 1, 2, 3, 4, 5]
    );
    assert_eq!(
        collect_numbers(&mut fixed_grouping(12, 1), 12),
        (0..12).collect::<Vec<_>>()
    );
    assert_eq!(
        collect_numbers(&mut fixed_grouping(3, 1), 7),
        vec![0, 1, 2, 0, 1, 2, 0]
    );
}

#[test]
fn test_fixed_grouping_per_group() {
    assert_eq!(
        collect_numbers(&mut fixed_grouping(0, 10), 1),
        (0..10).collect::<Vec<_>>()
    );
    assert_eq!(
        collect_numbers(&mut fixed_grouping(4, 3), 2),
        vec![0, 1, 2, 3, 0, 1]
    );
}

#[test]
fn test_fixed_grouping_random_passes_are_permutations() {
    let mut grouping = FixedGrouping::new(FixedGroupingParameters {
        num_groups: 10,
        random: true,
        seed: Some(7),
        ..Default::default()
    });
    let numbers = collect_numbers(&mut grouping, 100);

    for pass in numbers.chunks(10) {
        let groups: BTreeSet<u32> = pass.iter().copied().collect();
        assert_eq!(groups, (0..10).collect::<BTreeSet<_>>());
    }
}

#[test]
fn test_fixed_grouping_seed_is_reproducible() {
    let parameters = FixedGroupingParameters {
        num_groups: 10,
        random: true,
        seed: Some(42),
        ..Default::default()
    };
    let first = collect_numbers(&mut FixedGrouping::new(parameters.clone()), 30);
    let second = collect_numbers(&mut FixedGrouping::new(parameters), 30);
    assert_eq!(first, second);
}

#[test]
fn test_fixed_grouping_through_registry() {
    let registry = DerivationRegistry::with_builtin_derivations();
    let mut derivation = registry
        .resolve(FIXED_GROUPING, &json!({ "num_groups": 2, "per_group": 2 }))
        .unwrap();
    let values: GenericValues = derivation
        .derive(Path::new("/anything"))
        .unwrap()
        .unpack()
        .unwrap();
    assert_eq!(values.numbers, vec![0, 1]);
    assert!(values.strings.is_empty());
}

#[test]
fn test_derivation_failures_are_skipped_by_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let account = dir.path().join("Chase").join("card");
    std::fs::create_dir_all(&account).unwrap();
    std::fs::write(account.join("20211002-statements-1234-.pdf"), b"").unwrap();
    std::fs::write(account.join("notes.txt"), b"").unwrap();

    let config = Config {
        path: dir.path().join("out"),
        source_paths: vec![dir.path().join("Chase")],
        metadata: Some(MetadataSourceConfig::Derivation(
            DerivationConfig::new(FROM_STATEMENT).with_item_mode(ItemMode::Files),
        )),
        group_by: vec![GroupSpec::new("by_month", ["date.year", "date.month"])],
    };
    let mut symfs = SymFs::new(config).unwrap();
    let mapping = symfs.get_mapping().clone();

    let statement_path = account.join("20211002-statements-1234-.pdf");
    let expected = mapping_of(&[("by_month", "2021/10", &[statement_path.as_path()])]);
    assert_eq!(mapping, expected);

    let messages = warning_messages(symfs.warnings());
    assert_eq!(messages.len(), 1, "{:?}", messages);
    assert!(messages[0].starts_with("Unable to parse date from"));
    assert!(messages[0].contains("notes.txt"));
}
