//! Record schemas shipped with the crate.

define_records! {
    /// A record exercising scalar, repeated, and nested fields.
    TestMessage => "symfs.ext.TestMessage" {
        s: String,
        rs: Vec<String>,
        m: InnerTestMessage,
    }

    InnerTestMessage => "symfs.ext.TestMessage.InnerTestMessage" {
        value: String,
    }

    /// Metadata for a piece of media such as a film or an album.
    Media => "symfs.ext.Media" {
        title: String,
        kind: String,
        year: u32,
        tags: Vec<String>,
    }

    /// Metadata for a periodic statement issued by a financial institution.
    FinancialStatement => "symfs.ext.FinancialStatement" {
        institution: String,
        account: String,
        date: FinancialStatementDate,
    }

    /// Zero-padded date components, kept as strings so they sort and group
    /// the same way they appear in directory names.
    FinancialStatementDate => "symfs.ext.FinancialStatement.Date" {
        year: String,
        month: String,
        day: String,
    }

    /// Arbitrary values attached to an item, e.g. the group numbers handed
    /// out by the fixed grouping derivation.
    GenericValues => "symfs.ext.GenericValues" {
        numbers: Vec<u32>,
        strings: Vec<String>,
    }
}
