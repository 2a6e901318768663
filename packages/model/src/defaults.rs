//! Built-in starting template

use crate::registry::Variable;
use crate::settings::{Align, DocumentSettings, Fragments, HeaderLine, LineStyle, Signature};
use crate::tokens::canonical_token;
use chrono::{Datelike, Local, NaiveDate};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Key of the variable the signature date line refers to
pub const DATE_KEY: &str = "tanggal";

/// Long-form letter date, e.g. `17 Oktober 2026`
pub fn format_letter_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Default template dated today
pub fn default_template_today() -> DocumentSettings {
    default_template(Local::now().date_naive())
}

/// Default template with the date variable seeded from `today`
pub fn default_template(today: NaiveDate) -> DocumentSettings {
    let mut settings = DocumentSettings {
        title: Some("Surat Resmi".to_string()),
        city: "Jakarta".to_string(),
        show_header: true,
        show_signature: true,
        show_footer: false,
        show_attachment: false,
        ..DocumentSettings::default()
    };

    settings.fragments = Fragments {
        header: concat!(
            r#"<p style="text-align: center;"><b>NAMA INSTANSI</b><br>"#,
            r#"Jl. Alamat Instansi No. 1, Kota</p>"#
        )
        .to_string(),
        body: format!(
            concat!(
                "<p>Nomor: {}</p>",
                "<p>Kepada Yth. {}</p>",
                "<p>Dengan hormat,</p>",
                "<p>Isi surat.</p>"
            ),
            canonical_token("nomor"),
            canonical_token("nama"),
        ),
        footer: String::new(),
        attachment: String::new(),
    };

    settings.header_lines = vec![
        HeaderLine::new("line-1", 3.0, LineStyle::Solid),
        HeaderLine::new("line-2", 1.0, LineStyle::Solid),
    ];

    settings.signatures =
        vec![Signature::new("sig-1", "Nama Penandatangan", "Jabatan").with_align(Align::Right)];

    settings.variables = [
        Variable::new("nomor", "Nomor Surat", "001/ABC/2026"),
        Variable::new("nama", "Nama Penerima", ""),
        Variable::new(DATE_KEY, "Tanggal", format_letter_date(today)),
    ]
    .into_iter()
    .collect();

    settings
}
