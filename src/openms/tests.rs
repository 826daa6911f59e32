use super::*;
use crate::sdrf::SdrfTable;

fn table(tsv: &str) -> SdrfTable {
    SdrfTable::from_reader(std::io::Cursor::new(tsv)).unwrap()
}

fn output<'a>(output: &'a ConversionOutput, name: &str) -> &'a str {
    &output
        .files
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("missing output {name}"))
        .contents
}

const LABEL_FREE: &str = "\
source name\tcomment[data file]\tcomment[label]\tcomment[cleavage agent details]\tcomment[technical replicate]\tcomment[modification parameters]
sample 1\tf1.raw\tlabel free sample\tNT=Trypsin;AC=MS:1001251\t1\tNT=Carbamidomethyl;AC=UNIMOD:4;TA=C;MT=fixed
sample 1\tf2.raw\tlabel free sample\tNT=Trypsin;AC=MS:1001251\t2\tNT=Carbamidomethyl;AC=UNIMOD:4;TA=C;MT=fixed
sample 1\tf3.raw\tlabel free sample\tNT=Trypsin;AC=MS:1001251\t3\tNT=Carbamidomethyl;AC=UNIMOD:4;TA=C;MT=fixed
";

const TMT: &str = "\
source name\tcomment[data file]\tcomment[label]\tcomment[cleavage agent details]\tcomment[file uri]\tcomment[precursor mass tolerance]\tcomment[fragment mass tolerance]\tcomment[dissociation method]\tfactor value[disease]
sample 1\tbatch1.raw\tTMT126\tNT=Trypsin/P\tftp://x/batch1.raw\t10 ppm\t0.02 Da\tNT=HCD;AC=PRIDE:0000590\tcancer
sample 2\tbatch1.raw\tTMT127\tNT=Trypsin/P\tftp://x/batch1.raw\t10 ppm\t0.02 Da\tNT=HCD;AC=PRIDE:0000590\tnormal
sample 3\tbatch2.raw\tTMT126\tNT=Trypsin/P\tftp://x/batch2.raw\t10 ppm\t0.02 Da\tNT=HCD;AC=PRIDE:0000590\tcancer
sample 4\tbatch2.raw\tTMT127\tNT=Trypsin/P\tftp://x/batch2.raw\t10 ppm\t0.02 Da\tNT=HCD;AC=PRIDE:0000590\tnormal
";

#[test]
fn test_label_free_replicates() {
    let mut openms = OpenMs::new();
    let out = openms.convert(&table(LABEL_FREE), &ConvertOptions::new()).unwrap();

    assert_eq!(
        output(&out, DESIGN_FILE),
        "Fraction_Group\tFraction\tSpectra_Filepath\tLabel\tSample\n\
         1\t1\tf1.raw\t1\t1\n\
         2\t1\tf2.raw\t1\t1\n\
         3\t1\tf3.raw\t1\t1\n\
         \n\
         Sample\tMSstats_Condition\tMSstats_BioReplicate\n\
         1\tsample 1\t1\n"
    );

    let settings: Vec<&str> = output(&out, SEARCH_SETTINGS_FILE).lines().collect();
    assert_eq!(settings.len(), 4);
    assert_eq!(
        settings[1],
        "\tf1.raw\tCarbamidomethyl (C)\t\tData-Dependent Acquisition\tlabel free sample\t\
         10\tppm\t20\tppm\tHCD\tTrypsin"
    );

    let diagnostics = openms.diagnostics();
    assert_eq!(diagnostics.count("No precursor mass tolerance set. Assuming 10 ppm."), 3);
    assert_eq!(diagnostics.count("No factors specified. Adding dummy factor used as condition."), 3);
    assert!(out.conditions.is_empty());
}

#[test]
fn test_tmt_two_table() {
    let mut openms = OpenMs::new();
    let out = openms.convert(&table(TMT), &ConvertOptions::new()).unwrap();

    assert_eq!(
        output(&out, DESIGN_FILE),
        "Fraction_Group\tFraction\tSpectra_Filepath\tLabel\tSample\n\
         1\t1\tbatch1.raw\t1\t1\n\
         1\t1\tbatch1.raw\t2\t2\n\
         2\t1\tbatch2.raw\t1\t3\n\
         2\t1\tbatch2.raw\t2\t4\n\
         \n\
         Sample\tMSstats_Condition\tMSstats_BioReplicate\tMSstats_Mixture\n\
         1\tcancer\t1\t1\n\
         2\tnormal\t2\t1\n\
         3\tcancer\t3\t2\n\
         4\tnormal\t4\t2\n"
    );

    let settings: Vec<&str> = output(&out, SEARCH_SETTINGS_FILE).lines().collect();
    assert_eq!(settings.len(), 3);
    assert_eq!(
        settings[1],
        "ftp://x/batch1.raw\tbatch1.raw\t\tTMT6plex (K),TMT6plex (N-term)\t\
         Data-Dependent Acquisition\ttmt6plex\t10\tppm\t0.02\tDa\tHCD\tTrypsin/P"
    );
    assert_eq!(out.conditions, vec!["cancer".to_string(), "normal".to_string()]);
    assert_eq!(out.entries["batch1.raw"].labels, vec!["TMT126", "TMT127"]);
}

#[test]
fn test_one_table_legacy() {
    let mut openms = OpenMs::new();
    let options = ConvertOptions::new()
        .with_one_table(true)
        .with_legacy(true)
        .with_extension_convert("raw:mzML");
    let out = openms.convert(&table(TMT), &options).unwrap();

    assert_eq!(
        output(&out, DESIGN_FILE),
        "Fraction_Group\tFraction\tSpectra_Filepath\tLabel\tSample\tMSstats_Condition\t\
         MSstats_BioReplicate\tMSstats_Mixture\n\
         1\t1\tbatch1.mzML\t1\t1\tcancer\t1\t1\n\
         1\t1\tbatch1.mzML\t2\t2\tnormal\t2\t1\n\
         2\t1\tbatch2.mzML\t1\t3\tcancer\t3\t2\n\
         2\t1\tbatch2.mzML\t2\t4\tnormal\t4\t2\n"
    );
}

#[test]
fn test_one_table_without_legacy_sample() {
    let mut openms = OpenMs::new();
    let options = ConvertOptions::new().with_one_table(true);
    let out = openms.convert(&table(LABEL_FREE), &options).unwrap();

    let design: Vec<&str> = output(&out, DESIGN_FILE).lines().collect();
    assert_eq!(
        design[0],
        "Fraction_Group\tFraction\tSpectra_Filepath\tLabel\tMSstats_Condition\tMSstats_BioReplicate"
    );
    assert_eq!(design[1], "1\t1\tf1.raw\t1\tsample 1\t1");
}

#[test]
fn test_split_by_condition() {
    let mut openms = OpenMs::new();
    let options = ConvertOptions::new().with_split_by_columns(["factor value[disease]"]);
    let out = openms.convert(&table(TMT), &options).unwrap();

    let names: Vec<&str> = out.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "openms.tsv.0",
            "experimental_design.tsv.0",
            "openms.tsv.1",
            "experimental_design.tsv.1",
        ]
    );

    let cancer = output(&out, "experimental_design.tsv.0");
    assert!(cancer.contains("1\tcancer\t1\t1\n"));
    assert!(cancer.contains("3\tcancer\t3\t2\n"));
    assert!(!cancer.contains("normal"));
}

#[test]
fn test_split_keeps_file_channels() {
    let mut openms = OpenMs::new();
    let options = ConvertOptions::new().with_split_by_columns(["factor value[disease]"]);
    let out = openms.convert(&table(TMT), &options).unwrap();

    // TMT127 rows stay on channel 2 even when first in their split table
    let normal = output(&out, "experimental_design.tsv.1");
    let file_lines: Vec<&str> = normal.lines().skip(1).take_while(|l| !l.is_empty()).collect();
    assert_eq!(
        file_lines,
        vec!["2\t1\tbatch1.raw\t2\t2", "3\t1\tbatch2.raw\t2\t4"]
    );

    let cancer = output(&out, "experimental_design.tsv.0");
    assert!(cancer.contains("\tbatch1.raw\t1\t1\n"));
    assert!(cancer.contains("\tbatch2.raw\t1\t3\n"));
}

#[test]
fn test_unknown_split_column() {
    let mut openms = OpenMs::new();
    let options = ConvertOptions::new().with_split_by_columns(["factor value[age]"]);
    let err = openms.convert(&table(TMT), &options).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownColumn(_)));
}

#[test]
fn test_unparseable_cleavage_agent() {
    let tsv = LABEL_FREE.replace("NT=Trypsin;AC=MS:1001251", "Trypsin");
    let mut openms = OpenMs::new();
    let err = openms.convert(&table(&tsv), &ConvertOptions::new()).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidCleavageAgent(_)));
}

#[test]
fn test_unsupported_modification_is_fatal() {
    let tsv = LABEL_FREE.replace("AC=UNIMOD:4", "AC=MOD:01060");
    let mut openms = OpenMs::new();
    let err = openms.convert(&table(&tsv), &ConvertOptions::new()).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedModification(_)));
}

#[test]
fn test_unrecognized_label_is_fatal() {
    let tsv = LABEL_FREE.replace("label free sample", "heavy");
    let mut openms = OpenMs::new();
    let err = openms.convert(&table(&tsv), &ConvertOptions::new()).unwrap_err();
    assert!(matches!(err, ConvertError::UnrecognizedLabel(_)));
}

#[test]
fn test_declared_tmt_modification_kept() {
    let tsv = TMT.replace(
        "factor value[disease]\n",
        "factor value[disease]\tcomment[modification parameters]\n",
    );
    let tsv: String = tsv
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{}\n", line)
            } else {
                format!("{}\tNT=TMT6plex;AC=UNIMOD:737;TA=K;MT=fixed\n", line)
            }
        })
        .collect();

    let mut openms = OpenMs::new();
    let out = openms.convert(&table(&tsv), &ConvertOptions::new()).unwrap();
    let entry = &out.entries["batch1.raw"];
    assert_eq!(entry.fixed_modifications, "TMT6plex (K)");
    assert_eq!(entry.variable_modifications, "");
}

#[test]
fn test_characteristics_used_as_condition() {
    let tsv = "\
source name\tcharacteristics[organism part]\tcomment[data file]\tcomment[label]\tcomment[cleavage agent details]
liver\tliver\ta.raw\tlabel free sample\tNT=Lys-C
kidney\tkidney\tb.raw\tlabel free sample\tNT=Lys-C
";
    let mut openms = OpenMs::new();
    let out = openms.convert(&table(tsv), &ConvertOptions::new()).unwrap();

    assert_eq!(
        output(&out, DESIGN_FILE),
        "Fraction_Group\tFraction\tSpectra_Filepath\tLabel\tSample\n\
         1\t1\ta.raw\t1\t1\n\
         2\t1\tb.raw\t1\t2\n\
         \n\
         Sample\tMSstats_Condition\tMSstats_BioReplicate\n\
         1\tliver\t1\n\
         2\tkidney\t2\n"
    );
    assert_eq!(out.entries["a.raw"].enzyme, "Lys-C");
    assert_eq!(openms.diagnostics().count("No sample number identifier"), 4);
}
