use serde::{Deserialize, Serialize};

/// Layout of a processed document, page by page.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Layout {
    pub pages: Vec<PageLayout>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageLayout {
    pub number: u32,
    pub size_x: f64,
    pub size_y: f64,
    pub text_zones: Vec<TextZone>,
    pub regions: Vec<Region>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TextZone {
    pub paragraphs: Vec<Paragraph>,
}

/// Width, height, top and left offsets of an element on its page.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PageCoordinates {
    pub w: f64,
    pub h: f64,
    pub t: f64,
    pub l: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Paragraph {
    #[serde(flatten)]
    pub coordinates: PageCoordinates,
    pub lines: Vec<Line>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Line {
    #[serde(flatten)]
    pub coordinates: PageCoordinates,
    pub words: Vec<Word>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Word {
    #[serde(flatten)]
    pub coordinates: PageCoordinates,
    #[serde(alias = "fontsize")]
    pub font_size: f64,
    pub font_family: String,
    pub bold: bool,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Region {
    #[serde(flatten)]
    pub coordinates: PageCoordinates,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Layout {
    /// All words of the document in reading order, separated by spaces
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|p| &p.text_zones)
            .flat_map(|z| &z.paragraphs)
            .flat_map(|p| &p.lines)
            .flat_map(|l| &l.words)
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_deserialize() {
        let body = r#"{
            "pages": [{
                "number": 1,
                "sizeX": 595.3,
                "sizeY": 841.9,
                "textZones": [{
                    "paragraphs": [{
                        "l": 10.0, "t": 20.0, "w": 100.0, "h": 12.0,
                        "lines": [{
                            "l": 10.0, "t": 20.0, "w": 100.0, "h": 12.0,
                            "words": [
                                {"l": 10.0, "t": 20.0, "w": 40.0, "h": 12.0, "fontSize": 9.0, "fontFamily": "Arial", "bold": true, "text": "Hello"},
                                {"l": 55.0, "t": 20.0, "w": 45.0, "h": 12.0, "fontsize": 9.0, "fontFamily": "Arial", "bold": false, "text": "Gini"}
                            ]
                        }]
                    }]
                }],
                "regions": [{"l": 0.0, "t": 0.0, "w": 595.3, "h": 100.0, "type": "Header"}]
            }]
        }"#;

        let layout: Layout = serde_json::from_str(body).unwrap();
        let page = &layout.pages[0];
        assert_eq!(page.number, 1);
        assert_eq!(page.regions[0].kind, "Header");
        let word = &page.text_zones[0].paragraphs[0].lines[0].words[0];
        assert!(word.bold);
        assert_eq!(word.coordinates.w, 40.0);
        assert_eq!(page.text_zones[0].paragraphs[0].lines[0].words[1].font_size, 9.0);
        assert_eq!(layout.text(), "Hello Gini");
    }
}
