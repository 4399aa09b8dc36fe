use bal_validator::validate::{ValidateOptions, validate};

fn options(profile: &str) -> ValidateOptions {
    ValidateOptions {
        profile: profile.to_string(),
        ..ValidateOptions::default()
    }
}

const COMMUNE: &str = "0246e48c-f33d-433a-8984-034219be842e";
const COMMUNE_2: &str = "ba7bd979-71a9-4f68-a073-5c9b04deb0d4";
const TOPO: &str = "8a3bab10-f329-4ce3-9c7d-80a6a1946894";
const ADRESSE: &str = "2f21fcd0-9c53-4ca6-bbd2-3f6e6dd19893";

#[test]
fn profiles_validation_is_deterministic() {
    let input = b"numero;voie_nom\ndouze;rue Haute\n";
    let first = validate(input, &options("1.3")).unwrap();
    let second = validate(input, &options("1.3")).unwrap();
    assert_eq!(first.unique_errors, second.unique_errors);
    for (code, validation) in &first.profiles_validation {
        assert_eq!(
            validation.is_valid,
            second.profiles_validation[code].is_valid
        );
    }
}

#[test]
fn relax_profile_shares_the_strict_error_set() {
    let input = b"cle_interop;numero;voie_nom\n54084_0022_A;1;rue Haute\n";
    let strict = validate(input, &options("1.3")).unwrap();
    let relax = validate(input, &options("1.3-relax")).unwrap();
    assert_eq!(strict.unique_errors, relax.unique_errors);
    // Only severities may differ between the two reports.
    for (s, r) in strict.profil_errors.iter().zip(&relax.profil_errors) {
        assert_eq!(s.code, r.code);
    }
}

#[test]
fn empty_table_yields_exactly_the_empty_error() {
    let report = validate(b"numero;voie_nom\n", &options("1.3")).unwrap();
    assert!(report.parse_ok);
    assert_eq!(report.rows.as_deref().unwrap().len(), 0);
    assert!(report.rows_errors.is_empty());
    assert!(report.global_errors.contains(&"rows.empty".to_string()));
    assert!(!report.is_valid_for("1.3"));
}

#[test]
fn structural_failure_skips_content_validation() {
    // Single column: no delimiter candidate works, row boundaries unusable.
    let report = validate(b"numero\n1\n2\n", &options("1.3")).unwrap();
    assert!(!report.parse_ok);
    assert!(report.rows.is_none());
    assert!(report.fields.is_empty());
    assert!(report.profiles_validation.is_empty());
    assert!(report.unique_errors.is_empty());
    assert!(!report.parse_errors.is_empty());
}

#[test]
fn unescaped_delimiter_in_a_row_fails_the_parse() {
    // The second column value carries a raw ';', so the data row has three
    // fields against a two-field header.
    let report = validate(
        b"numero;voie_nom\n1;rue du Pont; aile Nord\n",
        &options("1.3"),
    )
    .unwrap();
    assert!(!report.parse_ok);
    assert_eq!(report.original_fields, vec!["numero", "voie_nom"]);
    assert!(report.rows.is_none());
    assert!(report.profiles_validation.is_empty());
}

#[test]
fn unterminated_quote_fails_the_parse_instead_of_dropping_rows() {
    let report = validate(
        b"numero;voie_nom\n1;\"rue Haute\n2;rue Basse\n",
        &options("1.3"),
    )
    .unwrap();
    assert!(!report.parse_ok);
    assert!(report.rows.is_none());
    assert!(report
        .parse_errors
        .iter()
        .any(|e| e.row == Some(1)));
}

#[test]
fn delimiter_only_rows_are_validated_not_skipped() {
    let report = validate(b"numero;voie_nom\n;\n", &options("1.3")).unwrap();
    assert!(report.parse_ok);
    assert_eq!(report.rows.as_deref().unwrap().len(), 1);
    assert!(report
        .rows_errors
        .contains(&"numero.valeur_manquante".to_string()));
    assert!(report
        .rows_errors
        .contains(&"voie_nom.valeur_manquante".to_string()));
    assert!(!report.global_errors.contains(&"rows.empty".to_string()));
}

#[test]
fn identifier_chain_scenarios() {
    let header = "numero;voie_nom;id_ban_commune;id_ban_toponyme;id_ban_adresse";

    let consistent = format!(
        "{header}\n1;rue Haute;{COMMUNE};{TOPO};{ADRESSE}\n99999;rue Haute;{COMMUNE};{TOPO};\n"
    );
    let report = validate(consistent.as_bytes(), &options("1.4")).unwrap();
    assert!(!report.global_errors.iter().any(|c| c.starts_with("rows.")));

    let second_commune = format!(
        "{header}\n1;rue Haute;{COMMUNE};{TOPO};{ADRESSE}\n2;rue Haute;{COMMUNE_2};{TOPO};{ADRESSE}\n"
    );
    let report = validate(second_commune.as_bytes(), &options("1.4")).unwrap();
    assert!(report
        .global_errors
        .contains(&"rows.multi_id_ban_commune".to_string()));
    assert!(!report
        .global_errors
        .contains(&"rows.every_line_required_id_ban".to_string()));

    let partial = format!(
        "{header}\n1;rue Haute;{COMMUNE};{TOPO};{ADRESSE}\n2;rue Haute;;;\n"
    );
    let report = validate(partial.as_bytes(), &options("1.4")).unwrap();
    assert!(report
        .global_errors
        .contains(&"rows.every_line_required_id_ban".to_string()));
    assert!(!report
        .global_errors
        .contains(&"rows.multi_id_ban_commune".to_string()));
}

#[test]
fn minimal_two_column_file_end_to_end() {
    let report = validate(b"numero;voie_nom\n1;rue du Moulin\n", &options("1.3")).unwrap();

    assert!(report.parse_ok);
    let missing: Vec<&str> = report
        .not_found_fields
        .iter()
        .map(|f| f.schema_name.as_str())
        .collect();
    assert!(missing.contains(&"commune_insee"));
    assert!(missing.contains(&"commune_nom"));
    assert!(missing.contains(&"position"));
    assert!(!missing.contains(&"numero"));

    let rows = report.rows.as_deref().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_valid);
    assert_eq!(rows[0].line, 1);

    // Field-level checks pass, but the missing required identifier columns
    // fail the profile.
    assert!(!report.is_valid_for("1.3"));
}

#[test]
fn warning_only_errors_never_flip_validity() {
    // CRLF file with fuzzy position casing: warnings in every profile.
    let input = b"numero;voie_nom;commune_insee;commune_nom;position;long;lat;date_der_maj\r\n\
        1;rue Haute;54084;Nancy;Entr\xc3\xa9e;6.18;48.69;2024-05-06\r\n";
    let report = validate(input, &options("1.3")).unwrap();
    assert!(report
        .unique_errors
        .contains(&"position.enum_fuzzy".to_string()));
    assert!(report.is_valid_for("1.3"));
    assert!(report.is_valid_for("1.3-relax"));
}

#[test]
fn non_standard_delimiter_is_reported_globally() {
    let report = validate(b"numero,voie_nom\n1,rue Haute\n", &options("1.3")).unwrap();
    assert!(!report.delimiter.is_valid);
    assert_eq!(report.delimiter.value, ",");
    assert!(report
        .global_errors
        .contains(&"file.delimiter.non_standard".to_string()));
    // Strict treats it as an error, relax downgrades it.
    assert!(!report.is_valid_for("1.3"));
    let relax = validate(b"numero,voie_nom\n1,rue Haute\n", &options("1.3-relax")).unwrap();
    assert!(relax
        .profil_errors
        .iter()
        .any(|e| e.code == "file.delimiter.non_standard" && e.level.to_string() == "W"));
}

#[test]
fn report_serializes_with_api_key_names() {
    let report = validate(b"numero;voie_nom\n1;rue du Moulin\n", &options("1.3")).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!(json.get("parseOk").is_some());
    assert!(json.get("profilesValidation").is_some());
    assert!(json.get("uniqueErrors").is_some());
    assert!(json.get("profilErrors").is_some());
    assert!(json.get("notFoundFields").is_some());
    assert_eq!(json["encoding"]["value"], "utf-8");
    assert_eq!(json["encoding"]["isValid"], true);

    let row = &json["rows"][0];
    assert!(row.get("rawValues").is_some());
    assert!(row.get("parsedValues").is_some());
    assert!(row.get("additionalValues").is_some());
    assert!(row.get("localizedValues").is_some());
    assert_eq!(row["isValid"], true);
    assert_eq!(row["line"], 1);
    assert_eq!(row["parsedValues"]["numero"], 1);
}

#[test]
fn windows_1252_input_is_decoded_and_flagged() {
    let input = b"numero;voie_nom\n1;rue de l'\xC9glise\n";
    let report = validate(input, &options("1.3")).unwrap();
    assert_eq!(report.encoding.value, "windows-1252");
    assert!(!report.encoding.is_valid);
    let rows = report.rows.as_deref().unwrap();
    assert_eq!(rows[0].raw_values["voie_nom"], "rue de l'Église");
    assert!(report
        .global_errors
        .contains(&"file.encoding.non_standard".to_string()));
}

#[test]
fn localized_headers_flow_into_row_detail() {
    let input = "numero;voie_nom;voie_nom_bre\n1;rue Haute;straed Uhel\n";
    let report = validate(input.as_bytes(), &options("1.3")).unwrap();
    let localized = &report.fields[2];
    assert_eq!(localized.locale.as_deref(), Some("bre"));
    let rows = report.rows.as_deref().unwrap();
    assert_eq!(rows[0].localized_values["voie_nom"]["bre"], "straed Uhel");
}
