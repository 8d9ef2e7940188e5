use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use iced::keyboard::{self, key};
use iced::widget::{
    button, column, container, horizontal_space, image as img, mouse_area, row, stack, text, Space,
};
use iced::{window, Color, ContentFit, Element, Length, Radians, Rotation, Size, Subscription, Task, Theme};

mod document;
mod flipbook;
mod layout;
mod renderer;
mod viewport;

use document::{DocumentMetrics, PageCache, DEFAULT_ASPECT_RATIO};
use flipbook::{FlipBook, FlipConfig, FlipEvent};
use layout::{compute_page_size, LayoutConfig, PageSize};
use renderer::{DocumentInfo, RenderError, RenderedPage, RendererHandle};
use viewport::ReaderPosition;

/// Vertical space taken by the controls above the page surface.
const CHROME_HEIGHT: f32 = 72.0;

/// Responsive page-flipping PDF viewer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Document to open.
    #[arg(default_value = "assets/sample.pdf")]
    file: PathBuf,
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter("flipbook_viewer=debug,info")
        .init();

    let args = Args::parse();

    iced::application("Flipbook Viewer", BookViewer::update, BookViewer::view)
        .subscription(BookViewer::subscription)
        .theme(|_| Theme::Light)
        .run_with(move || BookViewer::new(args.file))
}

#[derive(Debug, Clone)]
enum Message {
    DocumentLoaded(Result<DocumentInfo, RenderError>),
    PageRendered {
        page: usize,
        width: u32,
        result: Result<RenderedPage, RenderError>,
    },
    WindowResized(Size),
    PreviousPressed,
    NextPressed,
    JumpToStart,
    JumpToEnd,
    PageClicked,
    FlipTick,
}

#[derive(Debug, Clone, Copy)]
enum FlipCommand {
    Previous,
    Next,
    JumpTo(usize),
}

struct Book {
    metrics: DocumentMetrics,
    reader: ReaderPosition,
    flipbook: FlipBook,
    cache: PageCache,
}

struct BookViewer {
    file: PathBuf,
    renderer: RendererHandle,
    layout: LayoutConfig,
    flip_config: FlipConfig,
    window: Size,
    book: Option<Book>,
}

impl BookViewer {
    fn new(file: PathBuf) -> (Self, Task<Message>) {
        let renderer = RendererHandle::spawn();

        let load = {
            let renderer = renderer.clone();
            let path = file.clone();
            Task::perform(
                async move { renderer.load_document(path).await },
                Message::DocumentLoaded,
            )
        };
        let probe = window::get_latest()
            .and_then(window::get_size)
            .map(Message::WindowResized);

        (
            Self {
                file,
                renderer,
                layout: LayoutConfig::default(),
                flip_config: FlipConfig::default(),
                window: Size::new(1280.0, 800.0),
                book: None,
            },
            Task::batch([load, probe]),
        )
    }

    fn is_portrait(&self) -> bool {
        self.window.height > self.window.width
    }

    fn page_size(&self) -> PageSize {
        let aspect = self
            .book
            .as_ref()
            .map(|book| book.metrics.aspect_ratio())
            .unwrap_or(DEFAULT_ASPECT_RATIO);
        compute_page_size(
            self.window.width,
            self.window.height - CHROME_HEIGHT,
            aspect,
            self.is_portrait(),
            &self.layout,
        )
    }

    /// Request a render of `page` at the current layout width, unless it is
    /// already cached.
    fn render_page(&self, page: usize) -> Task<Message> {
        let Some(book) = &self.book else {
            return Task::none();
        };
        if book.metrics.page_count() == 0 || book.cache.contains(page, self.page_size().width) {
            return Task::none();
        }

        let width = self.page_size().width;
        let renderer = self.renderer.clone();
        Task::perform(
            async move { renderer.render_page(page, width).await },
            move |result| Message::PageRendered {
                page,
                width,
                result,
            },
        )
    }

    /// Bounds-check a navigation command and delegate it to the flip engine.
    /// The reader position is not touched here; it moves only when the flip
    /// engine reports completion.
    fn begin_flip(&mut self, command: FlipCommand) -> Task<Message> {
        let target = {
            let Some(book) = &mut self.book else {
                return Task::none();
            };
            let now = Instant::now();
            let started = match command {
                FlipCommand::Previous if book.reader.can_go_prev() => {
                    book.flipbook.flip_to_previous(now)
                }
                FlipCommand::Next if book.reader.can_go_next() => book.flipbook.flip_to_next(now),
                FlipCommand::JumpTo(index) => book.flipbook.jump_to(index, now),
                _ => false,
            };
            if !started {
                return Task::none();
            }
            book.flipbook.pending_target()
        };

        // Prefetch the incoming page so it is ready when the flip lands.
        match target {
            Some(page) => self.render_page(page),
            None => Task::none(),
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DocumentLoaded(Ok(info)) => {
                let mut metrics = DocumentMetrics::new(info.page_count);
                metrics.record_page_size(info.page_width, info.page_height);
                self.book = Some(Book {
                    metrics,
                    reader: ReaderPosition::new(info.page_count),
                    flipbook: FlipBook::new(info.page_count, self.flip_config),
                    cache: PageCache::default(),
                });
                self.render_page(0)
            }
            Message::DocumentLoaded(Err(error)) => {
                tracing::error!("failed to open {}: {error}", self.file.display());
                Task::none()
            }
            Message::PageRendered {
                page,
                width,
                result,
            } => {
                match result {
                    Ok(rendered) => {
                        if let Some(book) = &mut self.book {
                            let handle =
                                img::Handle::from_rgba(rendered.width, rendered.height, rendered.rgba);
                            book.cache.insert(page, width, handle);
                        }
                    }
                    Err(error) => tracing::error!("{error}"),
                }
                Task::none()
            }
            Message::WindowResized(size) => {
                if size.width > 0.0 && size.height > 0.0 {
                    self.window = size;
                }
                match &self.book {
                    Some(book) => self.render_page(book.reader.current_page()),
                    None => Task::none(),
                }
            }
            Message::PreviousPressed => self.begin_flip(FlipCommand::Previous),
            Message::NextPressed | Message::PageClicked => self.begin_flip(FlipCommand::Next),
            Message::JumpToStart => self.begin_flip(FlipCommand::JumpTo(0)),
            Message::JumpToEnd => match self.book.as_ref().map(|book| book.reader.last_page()) {
                Some(last) => self.begin_flip(FlipCommand::JumpTo(last)),
                None => Task::none(),
            },
            Message::FlipTick => {
                let event = self
                    .book
                    .as_mut()
                    .and_then(|book| book.flipbook.tick(Instant::now()));
                match event {
                    Some(FlipEvent::PageChanged(page)) => {
                        if let Some(book) = &mut self.book {
                            book.reader.set_page(page);
                            tracing::debug!("flip landed on page {}", book.flipbook.current_page());
                        }
                        self.render_page(page)
                    }
                    None => Task::none(),
                }
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            keyboard::on_key_press(handle_key),
        ];
        if self
            .book
            .as_ref()
            .is_some_and(|book| book.flipbook.is_flipping())
        {
            subscriptions
                .push(iced::time::every(Duration::from_millis(16)).map(|_| Message::FlipTick));
        }
        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        let Some(book) = &self.book else {
            return container(text("Loading document…").size(16))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let reader = &book.reader;
        let controls = row![
            button("⟵ Previous")
                .on_press_maybe(reader.can_go_prev().then_some(Message::PreviousPressed)),
            horizontal_space(),
            text(format!(
                "Page {} of {}",
                reader.current_page() + 1,
                reader.page_count()
            )),
            horizontal_space(),
            button("Next ⟶").on_press_maybe(reader.can_go_next().then_some(Message::NextPressed)),
        ]
        .spacing(10)
        .padding(10);

        let size = self.page_size();
        let surface: Element<Message> = match book.cache.get(reader.current_page(), size.width) {
            Some(handle) => {
                let mut page = img(handle)
                    .width(Length::Fixed(size.width as f32))
                    .height(Length::Fixed(size.height as f32))
                    .content_fit(ContentFit::Contain);
                if self.is_portrait() {
                    // The layout was computed against the transposed box; the
                    // quarter turn puts the page back into the real one.
                    page = page.rotation(Rotation::Solid(Radians(std::f32::consts::FRAC_PI_2)));
                }

                let mut layers = stack![page];
                let shadow = book.flipbook.shadow_opacity();
                if shadow > 0.0 {
                    layers = layers.push(
                        container(Space::new(Length::Fill, Length::Fill))
                            .width(Length::Fill)
                            .height(Length::Fill)
                            .style(move |_theme| container::Style {
                                background: Some(Color { a: shadow, ..Color::BLACK }.into()),
                                ..container::Style::default()
                            }),
                    );
                }
                if book.flipbook.config().show_page_corners {
                    layers = layers.push(
                        container(text("⌟").size(24))
                            .width(Length::Fill)
                            .height(Length::Fill)
                            .align_x(iced::alignment::Horizontal::Right)
                            .align_y(iced::alignment::Vertical::Bottom)
                            .padding(6),
                    );
                }

                if book.flipbook.config().click_to_flip {
                    mouse_area(layers).on_press(Message::PageClicked).into()
                } else {
                    layers.into()
                }
            }
            None => container(text("Rendering page…"))
                .center_x(Length::Fixed(size.width as f32))
                .center_y(Length::Fixed(size.height as f32))
                .into(),
        };

        let page_area = container(surface)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill);

        let mut content = column![controls, page_area].spacing(10).padding(10);
        if self.is_portrait() {
            content = content.push(
                container(text("Rotate your device to landscape for a larger page").size(14))
                    .width(Length::Fill)
                    .center_x(Length::Fill),
            );
        }
        content.into()
    }
}

fn handle_key(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::PreviousPressed),
        keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::NextPressed),
        keyboard::Key::Named(key::Named::Home) => Some(Message::JumpToStart),
        keyboard::Key::Named(key::Named::End) => Some(Message::JumpToEnd),
        _ => None,
    }
}
