use anyhow::Result;
use printpdf::{BuiltinFont, Mm, PdfDocument};

/// Fields typeset onto the certificate document.
#[derive(Debug, Clone)]
pub struct CertificateRender {
    pub student_name: String,
    pub course_title: String,
    pub score: Option<i32>,
    pub issued_on: String,
    pub verification_code: String,
}

/// Renders the certificate to PDF bytes: A4 landscape, builtin Helvetica
/// faces so no font assets are needed at runtime.
pub fn render_certificate(render: &CertificateRender) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Certificate of Completion", Mm(297.0), Mm(210.0), "certificate");

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let oblique = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;

    let layer = doc.get_page(page).get_layer(layer);

    layer.use_text("Certificate of Completion", 32.0, Mm(30.0), Mm(160.0), &bold);
    layer.use_text("This certifies that", 13.0, Mm(30.0), Mm(140.0), &regular);
    layer.use_text(render.student_name.as_str(), 26.0, Mm(30.0), Mm(126.0), &bold);
    layer.use_text(
        "has successfully completed the course",
        13.0,
        Mm(30.0),
        Mm(112.0),
        &regular,
    );
    layer.use_text(render.course_title.as_str(), 20.0, Mm(30.0), Mm(98.0), &oblique);

    let mut line_y = 80.0;
    if let Some(score) = render.score {
        layer.use_text(
            format!("Final score: {}%", score),
            13.0,
            Mm(30.0),
            Mm(line_y),
            &regular,
        );
        line_y -= 10.0;
    }

    layer.use_text(
        format!("Issued on {}", render.issued_on),
        13.0,
        Mm(30.0),
        Mm(line_y),
        &regular,
    );

    layer.use_text(
        format!("Verification code: {}", render.verification_code),
        11.0,
        Mm(30.0),
        Mm(35.0),
        &regular,
    );
    layer.use_text(
        format!(
            "Authenticity can be checked at /verify-certificate/{}",
            render.verification_code
        ),
        9.0,
        Mm(30.0),
        Mm(27.0),
        &oblique,
    );

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}
