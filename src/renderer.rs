//! PDF rendering service backed by pdfium.
//!
//! pdfium's types are not `Send`, so the library is bound once on a dedicated
//! worker thread that owns the loaded document for its whole life. The UI
//! talks to it through a cloneable handle over flume channels; requests
//! resolve asynchronously so they can be driven by `iced::Task`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pdfium_render::prelude::*;
use thiserror::Error;

/// Rendering failures. Cloneable so results can travel inside UI messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("pdfium library unavailable: {0}")]
    Bind(String),
    #[error("failed to load document: {0}")]
    Load(String),
    #[error("no document loaded")]
    NoDocument,
    #[error("failed to render page {index}: {reason}")]
    Render { index: usize, reason: String },
    #[error("render worker stopped")]
    WorkerGone,
}

/// Page count plus the intrinsic size of page 1, in PDF points. The page
/// size feeds the aspect-ratio measurement; an empty document reports zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub page_width: f32,
    pub page_height: f32,
}

/// One rasterized page, RGBA8.
#[derive(Clone)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for RenderedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedPage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

enum Request {
    Load {
        path: PathBuf,
        reply: flume::Sender<Result<DocumentInfo, RenderError>>,
    },
    RenderPage {
        index: usize,
        target_width: u32,
        reply: flume::Sender<Result<RenderedPage, RenderError>>,
    },
}

/// Cloneable handle to the render worker thread.
#[derive(Clone)]
pub struct RendererHandle {
    tx: flume::Sender<Request>,
}

impl RendererHandle {
    /// Spawn the worker thread and return a handle to it.
    pub fn spawn() -> Self {
        let (tx, rx) = flume::unbounded();
        std::thread::spawn(move || render_worker(&rx));
        Self { tx }
    }

    pub async fn load_document(&self, path: PathBuf) -> Result<DocumentInfo, RenderError> {
        let (reply, response) = flume::bounded(1);
        self.tx
            .send(Request::Load { path, reply })
            .map_err(|_| RenderError::WorkerGone)?;
        response
            .recv_async()
            .await
            .map_err(|_| RenderError::WorkerGone)?
    }

    pub async fn render_page(
        &self,
        index: usize,
        target_width: u32,
    ) -> Result<RenderedPage, RenderError> {
        let (reply, response) = flume::bounded(1);
        self.tx
            .send(Request::RenderPage {
                index,
                target_width,
                reply,
            })
            .map_err(|_| RenderError::WorkerGone)?;
        response
            .recv_async()
            .await
            .map_err(|_| RenderError::WorkerGone)?
    }
}

fn render_worker(rx: &flume::Receiver<Request>) {
    let pdfium = match bind_pdfium() {
        Ok(pdfium) => pdfium,
        Err(error) => {
            let error = RenderError::Bind(format!("{error:#}"));
            tracing::error!("{error}");
            // Keep answering so callers see the failure instead of hanging.
            while let Ok(request) = rx.recv() {
                match request {
                    Request::Load { reply, .. } => {
                        let _ = reply.send(Err(error.clone()));
                    }
                    Request::RenderPage { reply, .. } => {
                        let _ = reply.send(Err(error.clone()));
                    }
                }
            }
            return;
        }
    };

    let mut document = None;
    while let Ok(request) = rx.recv() {
        match request {
            Request::Load { path, reply } => match load_document(&pdfium, &path) {
                Ok((loaded, info)) => {
                    tracing::debug!(
                        "loaded {} ({} pages)",
                        path.display(),
                        info.page_count
                    );
                    document = Some(loaded);
                    let _ = reply.send(Ok(info));
                }
                Err(error) => {
                    let _ = reply.send(Err(RenderError::Load(format!("{error:#}"))));
                }
            },
            Request::RenderPage {
                index,
                target_width,
                reply,
            } => {
                let result = match document.as_ref() {
                    Some(document) => render_page(document, index, target_width).map_err(|error| {
                        RenderError::Render {
                            index,
                            reason: format!("{error:#}"),
                        }
                    }),
                    None => Err(RenderError::NoDocument),
                };
                let _ = reply.send(result);
            }
        }
    }
}

fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .context(
            "failed to bind to the PDFium library; install it or place the prebuilt \
             binary from https://github.com/bblanchon/pdfium-binaries next to the executable",
        )?;
    Ok(Pdfium::new(bindings))
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
) -> Result<(PdfDocument<'a>, DocumentInfo)> {
    let document = pdfium
        .load_pdf_from_file(path, None)
        .context("failed to open document")?;
    let page_count = document.pages().len() as usize;

    // Page 1's intrinsic size; zeros when there is nothing to measure, in
    // which case the viewer keeps its provisional aspect ratio.
    let (page_width, page_height) = match document.pages().get(0) {
        Ok(page) => (page.width().value, page.height().value),
        Err(_) => (0.0, 0.0),
    };

    Ok((
        document,
        DocumentInfo {
            page_count,
            page_width,
            page_height,
        },
    ))
}

fn render_page(
    document: &PdfDocument<'_>,
    index: usize,
    target_width: u32,
) -> Result<RenderedPage> {
    let page = document
        .pages()
        .get(index as u16)
        .context("page index out of bounds")?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width as i32)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page
        .render_with_config(&render_config)
        .context("pdfium failed to rasterize the page")?;

    let buffer = bitmap.as_raw_bytes();
    let image = image::RgbaImage::from_raw(
        bitmap.width() as u32,
        bitmap.height() as u32,
        buffer.to_vec(),
    )
    .context("bitmap dimensions do not match its buffer")?;

    Ok(RenderedPage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
