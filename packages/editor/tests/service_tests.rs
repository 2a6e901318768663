//! Session flows that go through the analysis and logo services

use chrono::NaiveDate;
use lettercraft_editor::{
    AnalysisService, AspectRatio, EditSession, EditorError, GeneratedImage, LogoService,
    ServiceError, Upload,
};
use lettercraft_model::{default_template, AnalysisRecord, DetectedVariable, FragmentId};
use std::future::Future;
use std::sync::Mutex;

fn session() -> EditSession {
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    EditSession::new("test-client", default_template(today))
}

fn record() -> AnalysisRecord {
    AnalysisRecord {
        institution_name: "DINAS PENDIDIKAN".to_string(),
        institution_address: "Jl. Merdeka No. 10".to_string(),
        body_markup: "<p>Kepada {{ $penerima }}</p>".to_string(),
        attachment_markup: Some("<p>Daftar hadir</p>".to_string()),
        detected_variables: vec![DetectedVariable {
            key: "penerima".to_string(),
            label: Some("Penerima".to_string()),
            default_value: Some("Bapak Kepala".to_string()),
        }],
        signature_name: Some("Dr. Sari".to_string()),
        signature_title: Some("Kepala Dinas".to_string()),
    }
}

struct FakeAnalysis {
    result: Result<AnalysisRecord, ServiceError>,
    calls: Mutex<usize>,
}

impl FakeAnalysis {
    fn new(result: Result<AnalysisRecord, ServiceError>) -> Self {
        Self {
            result,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl AnalysisService for FakeAnalysis {
    fn analyze(
        &self,
        _upload: &Upload,
    ) -> impl Future<Output = Result<AnalysisRecord, ServiceError>> + Send {
        *self.calls.lock().unwrap() += 1;
        let result = self.result.clone();
        async move { result }
    }
}

struct FakeLogo {
    bytes: Vec<u8>,
    seen: Mutex<Option<AspectRatio>>,
}

impl LogoService for FakeLogo {
    fn generate(
        &self,
        _prompt: &str,
        ratio: AspectRatio,
    ) -> impl Future<Output = Result<GeneratedImage, ServiceError>> + Send {
        *self.seen.lock().unwrap() = Some(ratio);
        let image = GeneratedImage {
            mime: "image/png".to_string(),
            bytes: self.bytes.clone(),
        };
        async move { Ok(image) }
    }
}

#[tokio::test]
async fn test_analysis_seeds_settings() {
    let mut session = session();
    let service = FakeAnalysis::new(Ok(record()));
    let upload = Upload::new("surat.pdf", "application/pdf", vec![0x25, 0x50]);

    session.analyze(&service, &upload).await.unwrap();

    let settings = session.settings();
    assert!(settings.fragment(FragmentId::Header).contains("<b>DINAS PENDIDIKAN</b>"));
    assert_eq!(settings.fragment(FragmentId::Body), "<p>Kepada {{ $penerima }}</p>");
    assert!(settings.show_attachment);
    assert_eq!(settings.signatures[0].name, "Dr. Sari");
    assert_eq!(
        settings.variables.get("penerima").unwrap().default_value,
        "Bapak Kepala"
    );
    assert!(settings.variables.contains("tanggal"));
    assert_eq!(
        session.surface(FragmentId::Body).fragment().text_content(),
        "Kepada {{ $penerima }}"
    );
    assert!(!session.analysis_pending());

    let preview = session.preview().unwrap();
    assert!(preview.contains(r#"data-variable="penerima">Bapak Kepala</span>"#));
}

#[tokio::test]
async fn test_failed_analysis_keeps_settings() {
    let mut session = session();
    let before = session.settings().clone();
    let service = FakeAnalysis::new(Err(ServiceError::Failed("timeout".to_string())));
    let upload = Upload::new("scan.jpg", "image/jpeg", vec![1, 2, 3]);

    let err = session.analyze(&service, &upload).await.unwrap_err();
    assert!(matches!(err, EditorError::Service(ServiceError::Failed(_))));
    assert_eq!(session.settings(), &before);
    assert!(!session.analysis_pending());
}

#[tokio::test]
async fn test_incomplete_analysis_is_rejected() {
    let mut session = session();
    let before = session.settings().clone();
    let mut incomplete = record();
    incomplete.body_markup.clear();
    let service = FakeAnalysis::new(Ok(incomplete));
    let upload = Upload::new("scan.png", "image/png", vec![1]);

    assert!(session.analyze(&service, &upload).await.is_err());
    assert_eq!(session.settings(), &before);
}

#[tokio::test]
async fn test_unsupported_upload_never_reaches_service() {
    let mut session = session();
    let service = FakeAnalysis::new(Ok(record()));
    let upload = Upload::new("surat.docx", "application/msword", vec![1]);

    let err = session.analyze(&service, &upload).await.unwrap_err();
    assert!(matches!(
        err,
        EditorError::Service(ServiceError::UnsupportedInput { .. })
    ));
    assert_eq!(service.calls(), 0);
    assert!(!session.analysis_pending());
}

#[tokio::test]
async fn test_logo_generation_sets_data_uri() {
    let mut session = session();
    let service = FakeLogo {
        bytes: b"hi".to_vec(),
        seen: Mutex::new(None),
    };

    let ratio = session
        .generate_logo(&service, "emblem of a school", "21:9")
        .await
        .unwrap();
    assert_eq!(ratio, AspectRatio::Square);
    assert_eq!(*service.seen.lock().unwrap(), Some(AspectRatio::Square));
    assert_eq!(
        session.settings().logo.as_deref(),
        Some("data:image/png;base64,aGk=")
    );
    assert!(session
        .export()
        .unwrap()
        .contains(r#"src="data:image/png;base64,aGk=""#));
}

#[tokio::test]
async fn test_empty_logo_is_an_error() {
    let mut session = session();
    let service = FakeLogo {
        bytes: Vec::new(),
        seen: Mutex::new(None),
    };
    let err = session
        .generate_logo(&service, "logo", "16:9")
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Service(ServiceError::EmptyResponse)));
    assert!(session.settings().logo.is_none());
}

#[test]
fn test_attachment_image_insert() {
    let mut session = session();
    let upload = Upload::new("peta.png", "image/png", b"hi".to_vec());
    session.insert_attachment_image(&upload).unwrap();
    assert_eq!(
        session.settings().fragment(FragmentId::Attachment),
        r#"<img src="data:image/png;base64,aGk=" alt="peta.png" style="max-width: 100%;">"#
    );

    let pdf = Upload::new("lampiran.pdf", "application/pdf", vec![1]);
    assert!(session.insert_attachment_image(&pdf).is_err());
}
