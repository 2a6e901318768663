use crate::layout::{header_line_style, paginate, signature_layout, PageKind, PagePlan, SignatureLayout};
use crate::substitute::{substitute, Mode};
use lettercraft_markup::{escape_attribute, escape_text};
use lettercraft_model::{
    canonical_token, Align, DocumentSettings, FragmentId, Signature, SignatureType, Toggle, DATE_KEY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during letter compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Invalid page geometry: {field} = {value}")]
    InvalidGeometry { field: &'static str, value: f64 },

    #[error("Invalid font size: {0}")]
    InvalidFontSize(f64),
}

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

/// Preview and export markup of one settings value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub preview: String,
    pub export: String,
}

impl CompiledDocument {
    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::Preview => &self.preview,
            Mode::Export => &self.export,
        }
    }
}

struct Context<'a> {
    settings: &'a DocumentSettings,
    mode: Mode,
    options: CompileOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(settings: &'a DocumentSettings, mode: Mode, options: CompileOptions) -> Self {
        Self {
            settings,
            mode,
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn open(&mut self, tag: &str) {
        self.add_line(tag);
        self.indent();
    }

    fn close(&mut self, tag: &str) {
        self.dedent();
        self.add_line(tag);
    }

    /// Substitute variables per the current mode
    fn resolve(&self, markup: &str) -> String {
        substitute(markup, &self.settings.variables, self.mode)
    }

    /// Escape plain text, then substitute variables
    fn resolve_text(&self, text: &str) -> String {
        self.resolve(&escape_text(text))
    }

    /// Mark the start of a block the downstream template gates on `toggles`
    fn open_gate(&mut self, toggles: &[Toggle]) {
        let condition = toggles
            .iter()
            .map(|toggle| format!("${}", toggle.flag()))
            .collect::<Vec<_>>()
            .join(" && ");
        self.add_line(&format!("<!-- @if({}) -->", condition));
    }

    fn close_gate(&mut self) {
        self.add_line("<!-- @endif -->");
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile both outputs with default options
pub fn compile(settings: &DocumentSettings) -> Result<CompiledDocument, CompileError> {
    compile_with(settings, CompileOptions::default())
}

pub fn compile_with(
    settings: &DocumentSettings,
    options: CompileOptions,
) -> Result<CompiledDocument, CompileError> {
    Ok(CompiledDocument {
        preview: render(settings, Mode::Preview, options.clone())?,
        export: render(settings, Mode::Export, options)?,
    })
}

/// Render one output. Preview and export share structure and differ only
/// in variable substitution.
pub fn render(
    settings: &DocumentSettings,
    mode: Mode,
    options: CompileOptions,
) -> Result<String, CompileError> {
    validate(settings)?;

    let mut ctx = Context::new(settings, mode, options);
    ctx.add_line("<!DOCTYPE html>");
    ctx.open("<html>");
    compile_head(&mut ctx);
    ctx.open("<body>");

    let pages = paginate(settings);
    for page in &pages {
        match page.kind {
            PageKind::Letter => compile_page(page, &mut ctx),
            PageKind::Attachment => {
                ctx.open_gate(&[Toggle::Attachment]);
                ctx.add_line(r#"<div class="page-break"></div>"#);
                compile_page(page, &mut ctx);
                ctx.close_gate();
            }
        }
    }

    ctx.close("</body>");
    ctx.close("</html>");

    let output = ctx.get_output();
    debug!(
        ?mode,
        pages = pages.len(),
        bytes = output.len(),
        "compiled letter"
    );
    Ok(output)
}

fn validate(settings: &DocumentSettings) -> Result<(), CompileError> {
    let page = &settings.page;
    let lengths = [
        ("width", page.width, false),
        ("height", page.height, false),
        ("marginTop", page.margin_top, true),
        ("marginRight", page.margin_right, true),
        ("marginBottom", page.margin_bottom, true),
        ("marginLeft", page.margin_left, true),
    ];
    for (field, value, zero_ok) in lengths {
        let valid = value.is_finite() && (value > 0.0 || (zero_ok && value == 0.0));
        if !valid {
            return Err(CompileError::InvalidGeometry { field, value });
        }
    }

    let size = settings.typography.font_size;
    if !(size.is_finite() && size > 0.0) {
        return Err(CompileError::InvalidFontSize(size));
    }
    Ok(())
}

fn compile_head(ctx: &mut Context) {
    let settings = ctx.settings;
    let page = &settings.page;
    let unit = page.unit;

    ctx.open("<head>");
    ctx.add_line("<meta charset=\"UTF-8\">");
    let title = settings.title.as_deref().unwrap_or("Letter");
    ctx.add_line(&format!("<title>{}</title>", escape_text(title)));

    ctx.open("<style>");
    ctx.add_line(&format!(
        "@page {{ size: {}{} {}{}; margin: 0; }}",
        page.width, unit, page.height, unit
    ));
    ctx.add_line(".page-break { page-break-after: always; break-after: page; }");
    if ctx.mode == Mode::Preview {
        ctx.add_line(
            ".variable-preview { background: #fef3c7; border-radius: 2px; padding: 0 2px; }",
        );
    }
    ctx.close("</style>");
    ctx.close("</head>");
}

fn page_style(settings: &DocumentSettings) -> String {
    let page = &settings.page;
    let u = page.unit;
    format!(
        "width: {w}{u}; min-height: {h}{u}; padding: {t}{u} {r}{u} {b}{u} {l}{u}; box-sizing: border-box; font-family: {family}; font-size: {size}pt;",
        w = page.width,
        h = page.height,
        t = page.margin_top,
        r = page.margin_right,
        b = page.margin_bottom,
        l = page.margin_left,
        u = u,
        family = font_family_value(&settings.typography.font_family),
        size = settings.typography.font_size,
    )
}

fn font_family_value(family: &str) -> String {
    if family.contains(char::is_whitespace) {
        format!("'{}'", family.replace('\'', ""))
    } else {
        family.to_string()
    }
}

fn compile_page(page: &PagePlan, ctx: &mut Context) {
    let settings = ctx.settings;
    let class = match page.kind {
        PageKind::Letter => "letter-page",
        PageKind::Attachment => "letter-page letter-attachment-page",
    };
    ctx.open(&format!(
        r#"<div class="{}" style="{}">"#,
        class,
        escape_attribute(&page_style(settings))
    ));

    if page.header {
        match page.kind {
            PageKind::Letter => ctx.open_gate(&[Toggle::Header]),
            PageKind::Attachment => ctx.open_gate(&[Toggle::Header, Toggle::RepeatHeader]),
        }
        compile_header(ctx);
        ctx.close_gate();
    }

    match page.kind {
        PageKind::Letter => {
            if !settings.fragment(FragmentId::Body).trim().is_empty() {
                compile_fragment(FragmentId::Body, ctx);
            }
            if page.signatures {
                ctx.open_gate(&[Toggle::Signature]);
                compile_signatures(&settings.signatures, ctx);
                ctx.close_gate();
            }
        }
        PageKind::Attachment => compile_fragment(FragmentId::Attachment, ctx),
    }

    if page.footer {
        ctx.open_gate(&[Toggle::Footer]);
        compile_fragment(FragmentId::Footer, ctx);
        ctx.close_gate();
    }

    ctx.close("</div>");
}

fn compile_fragment(id: FragmentId, ctx: &mut Context) {
    let settings = ctx.settings;
    let style = format!(
        "font-family: {};",
        font_family_value(settings.typography.family_for(id))
    );
    ctx.open(&format!(
        r#"<div class="{}" style="{}">"#,
        id.class_name(),
        escape_attribute(&style)
    ));
    let content = ctx.resolve(settings.fragment(id));
    if !content.is_empty() {
        ctx.add_line(&content);
    }
    ctx.close("</div>");
}

fn compile_header(ctx: &mut Context) {
    let settings = ctx.settings;
    let style = format!(
        "font-family: {};",
        font_family_value(settings.typography.family_for(FragmentId::Header))
    );
    ctx.open(&format!(
        r#"<div class="{}" style="{}">"#,
        FragmentId::Header.class_name(),
        escape_attribute(&style)
    ));
    if let Some(logo) = settings.logo.as_deref().filter(|l| !l.is_empty()) {
        ctx.add_line(&format!(
            r#"<img class="letter-logo" src="{}" alt="Logo" style="max-height: 80px;">"#,
            escape_attribute(logo)
        ));
    }
    let content = ctx.resolve(settings.fragment(FragmentId::Header));
    if !content.is_empty() {
        ctx.add_line(&content);
    }
    ctx.close("</div>");

    if !settings.header_lines.is_empty() {
        ctx.open(r#"<div class="header-lines">"#);
        for line in &settings.header_lines {
            ctx.add_line(&format!(
                r#"<div class="header-line" data-line="{}" style="{}"></div>"#,
                escape_attribute(&line.id),
                escape_attribute(&header_line_style(line))
            ));
        }
        ctx.close("</div>");
    }
}

fn justify(align: Align) -> &'static str {
    match align {
        Align::Left => "flex-start",
        Align::Center => "center",
        Align::Right => "flex-end",
    }
}

fn compile_signatures(signatures: &[Signature], ctx: &mut Context) {
    let layout = signature_layout(signatures);
    match &layout {
        SignatureLayout::None => return,
        SignatureLayout::Single { align, .. } => ctx.open(&format!(
            r#"<div class="letter-signatures signature-single" style="display: flex; justify-content: {}; margin-top: 32px;">"#,
            justify(*align)
        )),
        SignatureLayout::Grid { rows, .. } => ctx.open(&format!(
            r#"<div class="letter-signatures signature-grid" data-rows="{}" style="display: grid; grid-template-columns: 1fr 1fr; column-gap: 48px; row-gap: 24px; margin-top: 32px;">"#,
            rows
        )),
    }

    for placement in layout.placements() {
        let Some(signature) = signatures.get(placement.index) else {
            continue;
        };

        let (class, style) = match &layout {
            SignatureLayout::Grid { .. } if placement.full_width => (
                "signature-entry signature-full",
                format!(
                    "grid-row: {}; grid-column: 1 / span 2; justify-self: center; text-align: center;",
                    placement.row
                ),
            ),
            SignatureLayout::Grid { .. } => (
                "signature-entry",
                format!(
                    "grid-row: {}; grid-column: {}; text-align: center;",
                    placement.row, placement.column
                ),
            ),
            _ => ("signature-entry", "text-align: center;".to_string()),
        };

        ctx.open(&format!(
            r#"<div class="{}" data-row="{}" data-col="{}" style="{}">"#,
            class, placement.row, placement.column, style
        ));
        compile_signature_entry(signature, placement.date_line, ctx);
        ctx.close("</div>");
    }

    ctx.close("</div>");
}

fn compile_signature_entry(signature: &Signature, date_line: bool, ctx: &mut Context) {
    if let Some(label) = signature.label.as_deref().filter(|l| !l.is_empty()) {
        let label = ctx.resolve_text(label);
        ctx.add_line(&format!(r#"<div class="signature-label">{}</div>"#, label));
    }

    if date_line {
        let city = ctx.settings.city.trim();
        let date = canonical_token(DATE_KEY);
        let line = if city.is_empty() {
            date
        } else {
            format!("{}, {}", escape_text(city), date)
        };
        let line = ctx.resolve(&line);
        ctx.add_line(&format!(r#"<div class="signature-date">{}</div>"#, line));
    }

    match signature.kind {
        SignatureType::Wet => {
            ctx.add_line(r#"<div class="signature-space" style="height: 80px;"></div>"#)
        }
        SignatureType::Qr => {
            ctx.open(r#"<div class="signature-space signature-qr" style="height: 80px;">"#);
            ctx.add_line(r#"<div class="qr-placeholder" style="display: inline-block; width: 72px; height: 72px; border: 1px dashed #999999;">QR</div>"#);
            ctx.close("</div>");
        }
    }

    let name = ctx.resolve_text(&signature.name);
    ctx.add_line(&format!(
        r#"<div class="signature-name" style="font-weight: bold; text-decoration: underline;">{}</div>"#,
        name
    ));
    let title = ctx.resolve_text(&signature.title);
    ctx.add_line(&format!(r#"<div class="signature-title">{}</div>"#, title));
}
