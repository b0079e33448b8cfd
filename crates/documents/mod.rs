pub mod certificate_pdf;
