//! Embedded TrueType font for text outside WinAnsi.
//!
//! Hebrew and Arabic replacements cannot be set in a base-14 font. An
//! installed TrueType font that covers the text is picked from the style's
//! family hint and embedded as a `Type0` font with `Identity-H` encoding:
//! content streams carry two-byte glyph ids and a `ToUnicode` map keeps
//! the written text searchable.

use crate::error::{PatchError, PatchResult};
use log::{debug, warn};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use ttf_parser::{Face, GlyphId};
use walkdir::WalkDir;

/// Environment variable naming a TrueType file to try before installed fonts.
pub const FONT_ENV: &str = "PDFPATCH_FONT";

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// File names that provide a family, most specific first.
fn family_files(family: &str) -> &'static [&'static str] {
    match family.trim().to_ascii_lowercase().as_str() {
        "arial" => &["arial.ttf", "arial unicode.ttf", "arialuni.ttf"],
        "helvetica" => &["liberationsans-regular.ttf", "arial.ttf"],
        "dejavu sans" => &["dejavusans.ttf"],
        "noto sans hebrew" => &["notosanshebrew-regular.ttf"],
        "sans-serif" => &[
            "dejavusans.ttf",
            "freesans.ttf",
            "liberationsans-regular.ttf",
            "notosans-regular.ttf",
        ],
        _ => &[],
    }
}

fn font_error(path: &Path, e: ttf_parser::FaceParsingError) -> PatchError {
    PatchError::BackendError {
        backend: "ttf-parser".to_string(),
        message: format!("Failed to parse font '{}'", path.display()),
        source: Some(Box::new(e)),
    }
}

/// A TrueType font file loaded for embedding.
#[derive(Debug, Clone)]
pub struct UnicodeFont {
    path: PathBuf,
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    // Metrics below are in 1/1000 em.
    ascent: i32,
    descent: i32,
    cap_height: i32,
    bbox: [i32; 4],
}

impl UnicodeFont {
    pub fn load(path: &Path) -> PatchResult<Self> {
        let data = std::fs::read(path).map_err(|e| PatchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut font = {
            let face = Face::parse(&data, 0).map_err(|e| font_error(path, e))?;
            let units_per_em = face.units_per_em().max(1);
            let scale = |v: i16| i32::from(v) * 1000 / i32::from(units_per_em);
            let postscript_name = face
                .names()
                .into_iter()
                .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
                .and_then(|name| name.to_string())
                .map(|name| {
                    name.chars()
                        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                        .collect::<String>()
                })
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "PatchUnicode".to_string());
            let bbox = face.global_bounding_box();

            Self {
                path: path.to_path_buf(),
                data: Vec::new(),
                postscript_name,
                units_per_em,
                ascent: scale(face.ascender()),
                descent: scale(face.descender()),
                cap_height: scale(face.capital_height().unwrap_or(face.ascender())),
                bbox: [
                    scale(bbox.x_min),
                    scale(bbox.y_min),
                    scale(bbox.x_max),
                    scale(bbox.y_max),
                ],
            }
        };
        font.data = data;
        Ok(font)
    }

    /// Finds a font covering every character of `text`.
    ///
    /// `preferred` and then `$PDFPATCH_FONT` are tried first; after that the
    /// installed fonts named by `family_hint`, in hint order.
    pub fn locate(preferred: Option<&Path>, text: &str, family_hint: &str) -> Option<Self> {
        let named = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::env::var_os(FONT_ENV).map(PathBuf::from));
        for path in named {
            match Self::load(&path) {
                Ok(font) if font.covers(text) => return Some(font),
                Ok(_) => warn!("{}: no glyphs for '{}'", path.display(), text),
                Err(e) => warn!("{}", e),
            }
        }

        let installed = installed_fonts();
        family_hint
            .split(',')
            .flat_map(family_files)
            .filter_map(|file| installed.get(*file))
            .filter_map(|path| Self::load(path).ok())
            .find(|font| font.covers(text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descent below the baseline as a fraction of the font size.
    pub fn descent_ratio(&self) -> f32 {
        self.descent.unsigned_abs() as f32 / 1000.0
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// True if every non-control character of `text` has a glyph.
    pub fn covers(&self, text: &str) -> bool {
        match self.face() {
            Some(face) => text
                .chars()
                .filter(|c| !c.is_control())
                .all(|c| face.glyph_index(c).is_some()),
            None => false,
        }
    }

    /// Glyph id and advance (1/1000 em) for each character of `text`.
    /// Missing characters map to glyph 0.
    pub fn glyphs(&self, text: &str) -> Vec<(char, u16, u16)> {
        let Some(face) = self.face() else {
            return Vec::new();
        };
        let upem = u32::from(self.units_per_em);
        text.chars()
            .map(|ch| {
                let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
                let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                (ch, gid.0, (u32::from(advance) * 1000 / upem) as u16)
            })
            .collect()
    }
}

/// Every font file under the usual system and user font directories,
/// keyed by lowercase file name.
fn installed_fonts() -> BTreeMap<String, PathBuf> {
    let mut dirs: Vec<PathBuf> = SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect();
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
    }

    let mut found = BTreeMap::new();
    for dir in dirs.iter().filter(|d| d.is_dir()) {
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if let Some(name) = entry.file_name().to_str() {
                found
                    .entry(name.to_ascii_lowercase())
                    .or_insert_with(|| entry.path().to_path_buf());
            }
        }
    }
    debug!("{} installed font file(s)", found.len());
    found
}

/// A font being embedded into one document.
///
/// The object id is reserved up front so page resources can point at it;
/// the font objects are written by [`FontEmbedding::write`] once every page
/// has been drawn and the used glyphs are known.
#[derive(Debug)]
pub struct FontEmbedding {
    font: UnicodeFont,
    id: ObjectId,
    used: BTreeMap<u16, (char, u16)>,
}

impl FontEmbedding {
    pub fn new(font: UnicodeFont, doc: &mut Document) -> Self {
        Self {
            font,
            id: doc.new_object_id(),
            used: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn font(&self) -> &UnicodeFont {
        &self.font
    }

    /// `Identity-H` bytes for `visual`, already in drawing order, and its
    /// advance in 1/1000 em.
    pub fn show(&mut self, visual: &str) -> (Vec<u8>, u32) {
        let mut bytes = Vec::with_capacity(visual.len() * 2);
        let mut advance = 0u32;
        for (ch, gid, width) in self.font.glyphs(visual) {
            if gid == 0 {
                warn!("{}: no glyph for {:?}", self.font.path.display(), ch);
            } else {
                self.used.entry(gid).or_insert((ch, width));
            }
            bytes.extend_from_slice(&gid.to_be_bytes());
            advance += u32::from(width);
        }
        (bytes, advance)
    }

    /// Writes the font program, descriptor, CID font and `ToUnicode` map.
    pub fn write(self, doc: &mut Document) -> PatchResult<()> {
        let name = self.font.postscript_name.clone();
        let data = &self.font.data;

        let mut program = Stream::new(dictionary! { "Length1" => data.len() as i64 }, data.clone());
        let _ = program.compress();
        let program_id = doc.add_object(program);

        let [llx, lly, urx, ury] = self.font.bbox;
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => name.clone(),
            "Flags" => 32,
            "FontBBox" => vec![llx.into(), lly.into(), urx.into(), ury.into()],
            "ItalicAngle" => 0,
            "Ascent" => self.font.ascent,
            "Descent" => self.font.descent,
            "CapHeight" => self.font.cap_height,
            "StemV" => 80,
            "FontFile2" => program_id,
        });

        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for (&gid, &(_, width)) in &self.used {
            widths.push(Object::from(gid));
            widths.push(Object::Array(vec![width.into()]));
        }
        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => name.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "CIDToGIDMap" => "Identity",
            "DW" => 1000,
            "W" => widths,
        });

        let mut to_unicode = Stream::new(dictionary! {}, to_unicode_cmap(&self.used).into_bytes());
        let _ = to_unicode.compress();
        let to_unicode_id = doc.add_object(to_unicode);

        doc.objects.insert(
            self.id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => name,
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![cid_font_id.into()],
                "ToUnicode" => to_unicode_id,
            }),
        );
        debug!(
            "embedded {} with {} glyph(s)",
            self.font.path.display(),
            self.used.len()
        );
        Ok(())
    }
}

/// `ToUnicode` CMap from glyph ids back to characters.
fn to_unicode_cmap(used: &BTreeMap<u16, (char, u16)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(u16, char)> = used.iter().map(|(&gid, &(ch, _))| (gid, ch)).collect();
    // at most 100 entries per bfchar section
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
