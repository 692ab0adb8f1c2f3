//! # rxbatch-records
//!
//! Loads the patients and formulas spreadsheets for rxbatch.
//!
//! ## Overview
//!
//! [`SpreadsheetStore`] implements
//! [`RecordSource`](rxbatch_core::traits::RecordSource) on top of `calamine`,
//! so xlsx, xls, xlsb and ods workbooks are all accepted. Only the first
//! worksheet of each workbook is read.
//!
//! ```rust,ignore
//! use rxbatch_records::SpreadsheetStore;
//! use rxbatch_core::traits::RecordSource;
//!
//! let store = SpreadsheetStore::default();
//! let records = store.load(Path::new("pacientes.xlsx"), Path::new("formulas.xlsx"))?;
//! ```

pub mod cell;
pub mod store;

pub use store::{project_formulas, project_patients, SpreadsheetStore, Table};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use calamine::Data;

    use rxbatch_contracts::{
        error::RxError,
        records::CellValue,
        settings::{FormulaColumns, PatientColumns},
    };
    use rxbatch_core::traits::RecordSource;

    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn patients_table() -> Table {
        Table::from_rows(
            1,
            vec![
                vec![
                    s("Paciente"),
                    s("Formula"),
                    s("Cantidad_comp"),
                    s("Nr_de_Frasco"),
                    s("Receta"),
                    s("Notas"),
                ],
                vec![s("Ana"), Data::Float(1.0), Data::Float(2.0), Data::Float(0.0), Data::Empty, s("x")],
                vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty],
                vec![s("Bruno"), s("7"), s("30"), Data::Int(3), s("B"), Data::Empty],
                vec![s("Ana"), Data::Float(1.0), Data::Float(-4.0)],
            ],
        )
    }

    #[test]
    fn patients_are_projected_by_header_name() {
        let patients = project_patients(&patients_table(), &PatientColumns::default());

        assert_eq!(patients.len(), 3, "the blank row is skipped");

        assert_eq!(patients[0].row, 2);
        assert_eq!(patients[0].identity.as_deref(), Some("Ana"));
        assert_eq!(patients[0].formula_ref, Some(CellValue::Number(1.0)));
        assert_eq!(patients[0].quantity, Some(2));
        assert_eq!(patients[0].vial_count, Some(0));
        assert_eq!(patients[0].prescription_type, None);

        assert_eq!(patients[1].row, 4);
        assert_eq!(patients[1].formula_ref, Some(CellValue::Text("7".to_string())));
        assert_eq!(patients[1].quantity, Some(30));
        assert_eq!(patients[1].vial_count, Some(3));
        assert_eq!(patients[1].prescription_type.as_deref(), Some("B"));
    }

    #[test]
    fn short_rows_and_bad_counts_leave_fields_unset() {
        let patients = project_patients(&patients_table(), &PatientColumns::default());

        let last = &patients[2];
        assert_eq!(last.row, 5);
        assert_eq!(last.identity.as_deref(), Some("Ana"));
        assert_eq!(last.quantity, None, "negative quantity is not a count");
        assert_eq!(last.vial_count, None, "missing cell is unset");
    }

    #[test]
    fn missing_column_leaves_field_unset() {
        let table = Table::from_rows(
            1,
            vec![vec![s("Paciente")], vec![s("Ana")]],
        );
        let patients = project_patients(&table, &PatientColumns::default());

        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].identity.as_deref(), Some("Ana"));
        assert_eq!(patients[0].formula_ref, None);
        assert_eq!(patients[0].quantity, None);
    }

    #[test]
    fn custom_column_names_are_honoured() {
        let table = Table::from_rows(
            3,
            vec![
                vec![s(" Codigo "), s("Texto")],
                vec![Data::Int(5), s("Minoxidil 2.5mg")],
            ],
        );
        let columns = FormulaColumns {
            id: "Codigo".to_string(),
            detail: "Texto".to_string(),
        };
        let formulas = project_formulas(&table, &columns);

        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].row, 4);
        assert_eq!(formulas[0].id, Some(CellValue::Number(5.0)));
        assert_eq!(formulas[0].detail.as_deref(), Some("Minoxidil 2.5mg"));
    }

    #[test]
    fn configured_column_names_are_trimmed() {
        let columns = PatientColumns {
            identity: " Paciente".to_string(),
            quantity: "Cantidad_comp  ".to_string(),
            ..PatientColumns::default()
        };
        let patients = project_patients(&patients_table(), &columns);

        assert_eq!(patients[0].identity.as_deref(), Some("Ana"));
        assert_eq!(patients[0].quantity, Some(2));
    }

    #[test]
    fn formulas_keep_duplicates_in_order() {
        let table = Table::from_rows(
            1,
            vec![
                vec![s("Nº"), s("Detalle")],
                vec![Data::Float(1.0), s("first")],
                vec![Data::Float(1.0), s("second")],
            ],
        );
        let formulas = project_formulas(&table, &FormulaColumns::default());

        let details: Vec<_> = formulas.iter().map(|f| f.detail.as_deref()).collect();
        assert_eq!(details, vec![Some("first"), Some("second")]);
    }

    #[test]
    fn header_only_table_is_empty() {
        let table = Table::from_rows(1, vec![vec![s("Paciente")]]);
        assert!(table.is_empty());
        assert!(Table::from_rows(1, vec![]).is_empty());
        assert_eq!(patients_table().len(), 3, "blank rows are not counted");
    }

    #[test]
    fn missing_file_is_source_unreadable() {
        let store = SpreadsheetStore::default();
        let result = store.load(
            Path::new("/definitely/not/here/pacientes.xlsx"),
            Path::new("/definitely/not/here/formulas.xlsx"),
        );

        match result {
            Err(RxError::SourceUnreadable { path, .. }) => {
                assert!(path.ends_with("pacientes.xlsx"));
            }
            other => panic!("expected SourceUnreadable, got {:?}", other),
        }
    }

    #[test]
    fn non_spreadsheet_file_is_source_unreadable() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "Paciente,Formula").unwrap();

        let store = SpreadsheetStore::default();
        let result = store.load_patients(file.path());

        assert!(matches!(result, Err(RxError::SourceUnreadable { .. })));
    }
}
