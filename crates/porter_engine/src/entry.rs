use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use porter_core::{parse_header_date, photo_placeholder, DateParseError, Entry, IdMinter, MediaManifest};
use porter_logging::{porter_debug, porter_trace, porter_warn};
use scraper::{ElementRef, Html, Selector};

use crate::convert::Converter;
use crate::decode::decode_html;
use crate::media::MediaResolver;
use crate::options::ConvertOptions;
use crate::title::{clean_title, title_from_filename};

#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("no date found in page header of {0:?}")]
    MissingDate(PathBuf),
    #[error("could not parse date '{header}' in {path:?}: {source}")]
    InvalidDate {
        header: String,
        path: PathBuf,
        source: DateParseError,
    },
    #[error("entry {0:?} has no text and no photos")]
    Empty(PathBuf),
}

impl EntryError {
    /// Short label used when counting skipped entries.
    pub fn reason(&self) -> &'static str {
        match self {
            EntryError::Read { .. } => "unreadable",
            EntryError::MissingDate(_) => "missing date",
            EntryError::InvalidDate { .. } => "invalid date",
            EntryError::Empty(_) => "empty",
        }
    }
}

/// One converted entry and the media files it needs.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub entry: Entry,
    pub media: MediaManifest,
}

struct Selectors {
    header: Selector,
    title_block: Selector,
    title: Selector,
    container: Selector,
    body: Selector,
    asset_grid: Selector,
    grid_image: Selector,
    body_text: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn compile() -> Self {
        Self {
            header: selector("div.pageHeader"),
            title_block: selector("div.title"),
            title: selector("div.title span.s2"),
            container: selector("div.pageContainer"),
            body: selector("body"),
            asset_grid: selector("div.assetGrid"),
            grid_image: selector("div.gridItem.assetType_photo img.asset_image"),
            body_text: selector("div.bodyText"),
            paragraph: selector("p"),
        }
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Parses one exported entry document into an [`Entry`].
pub struct EntryParser<'a> {
    converter: &'a dyn Converter,
    options: &'a ConvertOptions,
    selectors: Selectors,
}

impl<'a> EntryParser<'a> {
    pub fn new(converter: &'a dyn Converter, options: &'a ConvertOptions) -> Self {
        Self {
            converter,
            options,
            selectors: Selectors::compile(),
        }
    }

    pub fn parse_file(
        &self,
        path: &Path,
        resources_dir: Option<&Path>,
        ids: &mut dyn IdMinter,
    ) -> Result<ParsedEntry, EntryError> {
        let bytes = fs::read(path).map_err(|source| EntryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = decode_html(&bytes);
        if decoded.had_errors {
            porter_warn!(
                "{:?} has bytes that are not valid {}; they were replaced",
                path,
                decoded.encoding_label
            );
        }
        porter_debug!("Decoded {:?} as {}", path, decoded.encoding_label);
        self.parse_document(&decoded.html, path, resources_dir, ids)
    }

    /// `document_path` anchors relative image references and the fallback title.
    pub fn parse_document(
        &self,
        html: &str,
        document_path: &Path,
        resources_dir: Option<&Path>,
        ids: &mut dyn IdMinter,
    ) -> Result<ParsedEntry, EntryError> {
        let doc = Html::parse_document(html);

        let header = doc
            .select(&self.selectors.header)
            .next()
            .map(element_text)
            .unwrap_or_default();
        if header.is_empty() {
            return Err(EntryError::MissingDate(document_path.to_path_buf()));
        }
        let created = parse_header_date(&header).map_err(|source| EntryError::InvalidDate {
            header: header.clone(),
            path: document_path.to_path_buf(),
            source,
        })?;

        let title = doc
            .select(&self.selectors.title)
            .next()
            .and_then(|el| clean_title(&element_text(el)))
            .or_else(|| title_from_filename(document_path));

        let mut entry = Entry::new(ids.mint(), created, self.options.time_zone.clone());
        let mut media = MediaManifest::new();
        let mut body = String::new();
        let resolver = MediaResolver::new(document_path, resources_dir, self.options);

        let container = doc
            .select(&self.selectors.container)
            .next()
            .or_else(|| doc.select(&self.selectors.body).next());
        for block in container
            .into_iter()
            .flat_map(|c| c.children().filter_map(ElementRef::wrap))
        {
            if self.selectors.header.matches(&block) || self.selectors.title_block.matches(&block) {
                continue;
            }

            if self.selectors.asset_grid.matches(&block) {
                for image in block.select(&self.selectors.grid_image) {
                    match resolver.resolve(image.value().attr("src"), created, ids) {
                        Ok(resolved) => {
                            body.push_str(&photo_placeholder(&resolved.photo.identifier));
                            body.push_str("\n\n");
                            entry.photos.push(resolved.photo);
                            media.insert(resolved.copy);
                        }
                        Err(err) => {
                            porter_warn!("Skipping image in {:?}: {}", document_path, err);
                        }
                    }
                }
                continue;
            }

            let fragments = self.text_fragments(block);
            if fragments.is_empty() {
                porter_trace!("Ignoring <{}> block in {:?}", block.value().name(), document_path);
            }
            for fragment in fragments {
                match self.converter.to_markdown(&fragment) {
                    Ok(markdown) => {
                        let markdown = markdown.trim();
                        if !markdown.is_empty() {
                            body.push_str(markdown);
                            body.push_str("\n\n");
                        }
                    }
                    Err(err) => {
                        porter_warn!("Dropping a text block in {:?}: {}", document_path, err);
                    }
                }
            }
        }

        let body = body.trim_end();
        entry.text = match title {
            Some(title) if body.is_empty() => format!("# {title}"),
            Some(title) => format!("# {title}\n\n{body}"),
            None => body.to_string(),
        };

        if entry.is_empty() {
            return Err(EntryError::Empty(document_path.to_path_buf()));
        }
        Ok(ParsedEntry { entry, media })
    }

    /// Markup of the text carried by one top-level block.
    ///
    /// Exports nest body text inconsistently relative to the visual paragraph,
    /// so three shapes are tried in order and the first that matches is used:
    /// the block itself (a `p`, or a `div.bodyText`, or a child of one), then
    /// `div.bodyText` containers below it, then paragraphs below it.
    fn text_fragments(&self, block: ElementRef) -> Vec<String> {
        let is_body_text = |el: &ElementRef| self.selectors.body_text.matches(el);
        let parent_is_body_text = block
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| is_body_text(&parent));
        if block.value().name() == "p" || is_body_text(&block) || parent_is_body_text {
            return vec![block.html()];
        }

        let nested: Vec<String> = block
            .select(&self.selectors.body_text)
            .filter(|el| !has_ancestor_within(el, &block, &is_body_text))
            .map(|el| el.html())
            .collect();
        if !nested.is_empty() {
            return nested;
        }

        block
            .select(&self.selectors.paragraph)
            .filter(|el| !has_ancestor_within(el, &block, |a| a.value().name() == "p"))
            .map(|el| el.html())
            .collect()
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// True when an ancestor of `el` strictly inside `block` satisfies `pred`.
fn has_ancestor_within<'a>(
    el: &ElementRef<'a>,
    block: &ElementRef<'a>,
    pred: impl Fn(&ElementRef<'a>) -> bool,
) -> bool {
    el.ancestors()
        .take_while(|node| node.id() != block.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| pred(&ancestor))
}
