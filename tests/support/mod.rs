//! A simulated capitals app and its screen descriptions.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::time::Duration;

use uiwright::driver::LAUNCH_SCREEN_ENV;
use uiwright::prelude::*;
use uiwright::query::{resolve, resolve_all};

/// Rows of the table visible at once.
pub const VISIBLE_ROWS: usize = 5;

/// Rows moved by one scroll swipe.
const SCROLL_STEP: usize = 3;

const WIDTH: f64 = 390.0;
const HEIGHT: f64 = 844.0;
const ROW_HEIGHT: f64 = 60.0;

pub struct Capital {
    pub name: &'static str,
    pub country: &'static str,
    pub population: &'static str,
    pub share: f32,
}

impl Capital {
    fn population_count(&self) -> u64 {
        self.population.replace(',', "").parse().unwrap_or(0)
    }
}

pub const CAPITALS: [Capital; 8] = [
    Capital { name: "Beijing", country: "China", population: "21,542,000", share: 1.50 },
    Capital { name: "Algiers", country: "Algeria", population: "3,415,811", share: 7.63 },
    Capital { name: "N'Djamena", country: "Chad", population: "916,000", share: 5.31 },
    Capital { name: "Accra", country: "Ghana", population: "2,514,000", share: 7.91 },
    Capital { name: "Yerevan", country: "Armenia", population: "1,092,800", share: 36.91 },
    Capital { name: "Abuja", country: "Nigeria", population: "3,464,123", share: 1.59 },
    Capital { name: "Islamabad", country: "Pakistan", population: "1,014,825", share: 0.44 },
    Capital {
        name: "Abu Dhabi",
        country: "United Arab Emirates",
        population: "1,483,000",
        share: 15.69,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Capital,
    Country,
    Population,
}

impl Column {
    fn from_header(label: &str) -> Option<Self> {
        match label {
            "Capital" => Some(Column::Capital),
            "Country" => Some(Column::Country),
            "Population" => Some(Column::Population),
            _ => None,
        }
    }

    fn compare(self, a: &Capital, b: &Capital) -> Ordering {
        match self {
            Column::Capital => a.name.cmp(b.name),
            Column::Country => a.country.cmp(b.country),
            Column::Population => a.population_count().cmp(&b.population_count()),
        }
    }
}

enum View {
    Table,
    Detail(usize),
}

/// Application logic behind a [`MemoryDriver`].
///
/// The table starts sorted by capital name. Tapping a column header sorts by
/// it, and tapping the sorted column again reverses the order. Tapping any
/// text in a row opens that capital's detail view.
pub struct CapitalsApp {
    order: Vec<usize>,
    column: Column,
    ascending: bool,
    offset: usize,
    view: View,
    pub refreshes: usize,
}

impl CapitalsApp {
    pub fn new() -> Self {
        let mut app = Self {
            order: (0..CAPITALS.len()).collect(),
            column: Column::Capital,
            ascending: true,
            offset: 0,
            view: View::Table,
            refreshes: 0,
        };
        app.sort();
        app
    }

    fn sort(&mut self) {
        let (column, ascending) = (self.column, self.ascending);
        self.order.sort_by(|&a, &b| {
            let ordering = column.compare(&CAPITALS[a], &CAPITALS[b]);
            if ascending { ordering } else { ordering.reverse() }
        });
        self.offset = 0;
    }

    fn tap_header(&mut self, column: Column) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column;
            self.ascending = true;
        }
        self.sort();
    }

    fn visible(&self) -> &[usize] {
        let end = (self.offset + VISIBLE_ROWS).min(self.order.len());
        &self.order[self.offset..end]
    }

    fn row_for(&self, text: &str) -> Option<usize> {
        self.visible().iter().copied().find(|&index| {
            let capital = &CAPITALS[index];
            capital.name == text || capital.country == text || capital.population == text
        })
    }

    fn tap(&mut self, tree: &Node, target: &uiwright::driver::Target) {
        match self.view {
            View::Detail(_) => {
                if target.matches_id("Back") {
                    self.view = View::Table;
                }
            }
            View::Table => {
                let is_button = tree
                    .at_path(&target.path)
                    .is_some_and(|node| node.element_type == ElementType::Button);
                let label = target.label.as_deref().unwrap_or_default();
                if is_button {
                    if let Some(column) = Column::from_header(label) {
                        self.tap_header(column);
                    }
                } else if let Some(index) = self.row_for(label) {
                    self.view = View::Detail(index);
                }
            }
        }
    }

    fn swipe(&mut self, direction: SwipeDirection) {
        let max_offset = self.order.len().saturating_sub(VISIBLE_ROWS);
        match direction {
            SwipeDirection::Up => self.offset = (self.offset + SCROLL_STEP).min(max_offset),
            SwipeDirection::Down => self.offset = self.offset.saturating_sub(SCROLL_STEP),
            SwipeDirection::Left | SwipeDirection::Right => {}
        }
    }

    pub fn render(&self) -> Node {
        let screen = match self.view {
            View::Table => self.render_table(),
            View::Detail(index) => render_detail(&CAPITALS[index]),
        };
        let mut app = Node::new(ElementType::Application)
            .frame(Frame::new(0.0, 0.0, WIDTH, HEIGHT))
            .child(screen);
        if matches!(self.view, View::Detail(_)) {
            app = app.child(
                Node::new(ElementType::NavigationBar)
                    .frame(Frame::new(0.0, 0.0, WIDTH, 44.0))
                    .child(
                        Node::new(ElementType::Button)
                            .label("Back")
                            .frame(Frame::new(8.0, 4.0, 60.0, 36.0)),
                    ),
            );
        }
        app
    }

    fn render_table(&self) -> Node {
        let headers = ["Capital", "Country", "Population"]
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                Node::new(ElementType::Button)
                    .label(label)
                    .frame(Frame::new(i as f64 * 130.0, 110.0, 130.0, 40.0))
            });
        let rows = self.visible().iter().enumerate().map(|(i, &index)| {
            let capital = &CAPITALS[index];
            let y = 150.0 + i as f64 * ROW_HEIGHT;
            Node::new(ElementType::Cell)
                .frame(Frame::new(0.0, y, WIDTH, ROW_HEIGHT))
                .child(text(capital.name, Frame::new(0.0, y, 130.0, ROW_HEIGHT)))
                .child(text(capital.country, Frame::new(130.0, y, 130.0, ROW_HEIGHT)))
                .child(text(capital.population, Frame::new(260.0, y, 130.0, ROW_HEIGHT)))
        });

        Node::new(ElementType::Other)
            .identifier("CapitalTableView")
            .frame(Frame::new(0.0, 0.0, WIDTH, HEIGHT))
            .child(text("Top 100 Capitals", Frame::new(16.0, 60.0, 358.0, 40.0)))
            .child(
                Node::new(ElementType::CollectionView)
                    .identifier("CapitalTableView.Table")
                    .frame(Frame::new(0.0, 110.0, WIDTH, HEIGHT - 110.0))
                    .children(headers)
                    .children(rows),
            )
    }
}

impl Default for CapitalsApp {
    fn default() -> Self {
        Self::new()
    }
}

fn text(label: &str, frame: Frame) -> Node {
    Node::new(ElementType::StaticText).label(label).frame(frame)
}

fn render_detail(capital: &Capital) -> Node {
    let labelled = |id: &str, label: String, y: f64| {
        Node::new(ElementType::StaticText)
            .identifier(id)
            .label(label)
            .frame(Frame::new(20.0, y, WIDTH - 40.0, 40.0))
    };

    Node::new(ElementType::Other)
        .identifier("CapitalView")
        .frame(Frame::new(0.0, 44.0, WIDTH, HEIGHT - 44.0))
        .child(labelled("CapitalView.Flag", format!("Flag of {}", capital.country), 100.0))
        .child(labelled("CapitalView.Name", capital.name.to_string(), 280.0))
        .child(labelled("CapitalView.Country", capital.country.to_string(), 330.0))
        .child(
            Node::new(ElementType::Other)
                .identifier("CapitalView.PopulationStack")
                .frame(Frame::new(20.0, 380.0, WIDTH - 40.0, 90.0))
                .child(labelled(
                    "CapitalView.Population",
                    format!("Population: {}", capital.population),
                    390.0,
                ))
                .child(labelled(
                    "CapitalView.Percentage",
                    format!("Percentage of Country's pop: {:.2}%", capital.share),
                    430.0,
                )),
        )
}

impl GestureHandler for CapitalsApp {
    fn on_launch(&mut self, tree: &mut Node, config: &LaunchConfig) {
        *self = Self::new();
        if config.get_launch_screen() == Some("CapitalView") {
            self.view = View::Detail(0);
        }
        *tree = self.render();
    }

    fn on_gesture(&mut self, tree: &mut Node, gesture: &Gesture) -> bool {
        match gesture {
            Gesture::Tap { target } => self.tap(tree, target),
            Gesture::DoubleTap { target } => {
                self.tap(tree, target);
                let refreshed = self.render();
                self.tap(&refreshed, target);
            }
            Gesture::Swipe { direction, .. } if matches!(self.view, View::Table) => {
                self.swipe(*direction)
            }
            Gesture::Drag { from, to, .. } if to.y > from.y && self.offset == 0 => {
                self.refreshes += 1;
            }
            _ => return false,
        }
        *tree = self.render();
        true
    }
}

/// A phone driver running the capitals app.
pub fn capitals_driver() -> MemoryDriver {
    let app = CapitalsApp::new();
    MemoryDriver::new(app.render()).with_handler(app)
}

/// Short timings so failing waits finish quickly.
pub fn test_config() -> SessionConfig {
    SessionConfig::new()
        .short_timeout(Duration::from_millis(500))
        .poll_interval(Duration::from_millis(50))
        .artifacts(ArtifactMode::Off)
}

/// Launch environment key the app reads its first screen from.
pub const LAUNCH_KEY: &str = LAUNCH_SCREEN_ENV;

pub struct CapitalTableView;

#[derive(Debug, Clone)]
pub enum TableElement {
    Title,
    Table,
    CapitalHeader,
    CountryHeader,
    PopulationHeader,
    Text(String),
}

impl ElementRepresentable for TableElement {
    fn query(&self) -> ElementQuery {
        let root = CapitalTableView::root_query();
        match self {
            TableElement::Title => root.static_text("Top 100 Capitals"),
            TableElement::Table => root.collection_view("CapitalTableView.Table"),
            TableElement::CapitalHeader => root.button("Capital"),
            TableElement::CountryHeader => root.button("Country"),
            TableElement::PopulationHeader => root.button("Population"),
            TableElement::Text(name) => root.static_text(name.as_str()),
        }
    }
}

impl ScreenSpec for CapitalTableView {
    const IDENTITY: &'static str = "CapitalTableView";
    type Element = TableElement;
}

pub struct CapitalView;

#[derive(Debug, Clone)]
pub enum CapitalElement {
    Flag,
    Name,
    Country,
    TextEntry(String),
    Population(String),
    PercentagePop(f32),
    BackButton,
}

impl ElementRepresentable for CapitalElement {
    fn query(&self) -> ElementQuery {
        let root = ElementQuery::root();
        let stack = root.identifier("CapitalView.PopulationStack");
        match self {
            CapitalElement::Flag => root.static_text("CapitalView.Flag"),
            CapitalElement::Name => root.static_text("CapitalView.Name"),
            CapitalElement::Country => root.static_text("CapitalView.Country"),
            CapitalElement::TextEntry(text) => root.static_text(text.as_str()),
            CapitalElement::Population(population) => {
                stack.static_text(format!("Population: {population}"))
            }
            CapitalElement::PercentagePop(share) => {
                stack.static_text(format!("Percentage of Country's pop: {share:.2}%"))
            }
            CapitalElement::BackButton => root.button("Back"),
        }
    }
}

impl ScreenSpec for CapitalView {
    const IDENTITY: &'static str = "CapitalView";
    type Element = CapitalElement;
}

/// Labels of the first visible row: capital, country and population.
pub async fn first_row(session: &Session) -> Vec<String> {
    let cells = CapitalTableView::root_query()
        .collection_view("CapitalTableView.Table")
        .cells();
    let tree = session.snapshot().await.unwrap();
    let Some(cell) = resolve(&cells, &tree) else {
        return Vec::new();
    };
    resolve_all(&ElementQuery::root().static_texts(), &cell.node)
        .into_iter()
        .filter_map(|(_, node)| node.label.clone())
        .collect()
}

pub fn row(name: &str) -> TableElement {
    TableElement::Text(name.to_string())
}
