use std::collections::VecDeque;
use std::path::Path;

use crate::config::MenuMetrics;
use crate::model::{IconGeometry, MenuAction, MenuActivation, MenuModel, MenuPosition};

const MENU_ID_TITLE: &str = "title";
const MENU_ID_QUIT: &str = "quit";
const MENU_ID_ENTRY_PREFIX: &str = "entry_";
const KEPT_MENUS: usize = 4;

/// Menu id of the model item at `index`. Entry ids carry the generation
/// of the render so a click maps back to the model it was shown from.
pub fn item_menu_id(model: &MenuModel, generation: u64, index: usize) -> String {
    match model.get(index).map(|item| &item.on_activate) {
        Some(MenuActivation::None) => MENU_ID_TITLE.to_string(),
        Some(MenuActivation::Quit) => MENU_ID_QUIT.to_string(),
        _ => format!("{}{}_{}", MENU_ID_ENTRY_PREFIX, generation, index),
    }
}

pub fn parse_menu_action(raw: &str) -> Option<MenuAction> {
    if raw == MENU_ID_QUIT {
        Some(MenuAction::Quit)
    } else if let Some(rest) = raw.strip_prefix(MENU_ID_ENTRY_PREFIX) {
        let (generation, index) = rest.split_once('_')?;
        Some(MenuAction::Activate {
            generation: generation.parse().ok()?,
            index: index.parse().ok()?,
        })
    } else {
        None
    }
}

/// Models handed to the toolkit, newest last. A menu that is still on
/// screen after a rebuild resolves against its own model.
#[derive(Debug, Default)]
pub struct RenderedMenus {
    next_generation: u64,
    models: VecDeque<(u64, MenuModel)>,
}

impl RenderedMenus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `model` and return the generation its menu ids must use.
    pub fn insert(&mut self, model: MenuModel) -> (u64, &MenuModel) {
        let generation = self.next_generation;
        self.next_generation += 1;
        if self.models.len() == KEPT_MENUS {
            self.models.pop_front();
        }
        self.models.push_back((generation, model));
        let (_, model) = &self.models[self.models.len() - 1];
        (generation, model)
    }

    pub fn get(&self, generation: u64) -> Option<&MenuModel> {
        self.models
            .iter()
            .find(|(kept, _)| *kept == generation)
            .map(|(_, model)| model)
    }

    /// What a clicked menu item asks for, or `None` when its menu is gone.
    pub fn activation(&self, action: &MenuAction) -> Option<MenuActivation> {
        match action {
            MenuAction::Quit => Some(MenuActivation::Quit),
            MenuAction::Activate { generation, index } => self
                .get(*generation)
                .and_then(|model| model.get(*index))
                .map(|item| item.on_activate.clone()),
        }
    }
}

/// Height the rendered menu will take: every item, the two separators
/// around the entry list, and padding on both edges.
pub fn estimate_menu_height(model: &MenuModel, metrics: &MenuMetrics) -> u32 {
    let separators: u32 = if model.is_empty() { 0 } else { 2 };
    let rows = u32::try_from(model.len()).unwrap_or(u32::MAX);
    rows.saturating_mul(metrics.item_height)
        .saturating_add(separators.saturating_mul(metrics.separator_height))
        .saturating_add(metrics.padding.saturating_mul(2))
}

/// Anchor the menu's bottom-left corner to the icon's top-left corner.
pub fn popup_position(icon: &IconGeometry, menu_height: u32) -> MenuPosition {
    MenuPosition {
        x: icon.x,
        y: icon.y - f64::from(menu_height),
    }
}

pub fn build_tooltip(
    title: &str,
    folder: &Path,
    entry_count: Option<usize>,
    last_error: Option<&str>,
) -> String {
    let mut lines = vec![title.to_string(), folder.display().to_string()];
    match entry_count {
        Some(1) => lines.push("1 item".to_string()),
        Some(count) => lines.push(format!("{} items", count)),
        None => {}
    }
    if let Some(error) = last_error {
        lines.push(format!("⛔ {}", error));
    }
    lines.join("\n")
}

/// Render the model as a native menu: title, separator, entries,
/// separator, quit.
#[cfg(any(target_os = "windows", target_os = "macos"))]
pub fn render_menu(
    model: &MenuModel,
    generation: u64,
) -> anyhow::Result<tray_icon::menu::Menu> {
    use tray_icon::menu::{IconMenuItem, Menu, MenuItem, PredefinedMenuItem};

    use crate::ui::icon::create_menu_icon;

    let menu = Menu::new();
    for (index, item) in model.items.iter().enumerate() {
        let id = item_menu_id(model, generation, index);
        if item.on_activate == MenuActivation::Quit {
            menu.append(&PredefinedMenuItem::separator())?;
        }

        let icon = match item.icon_key {
            Some(key) => match create_menu_icon(key) {
                Ok(icon) => Some(icon),
                Err(err) => {
                    log::warn!("Menu icon {} unavailable: {}", key.as_str(), err);
                    None
                }
            },
            None => None,
        };
        match icon {
            Some(icon) => {
                let entry =
                    IconMenuItem::with_id(id, &item.label, item.is_enabled(), Some(icon), None);
                menu.append(&entry)?;
            }
            None => {
                let entry = MenuItem::with_id(id, &item.label, item.is_enabled(), None);
                menu.append(&entry)?;
            }
        }

        if item.on_activate == MenuActivation::None {
            menu.append(&PredefinedMenuItem::separator())?;
        }
    }
    Ok(menu)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{DirectoryEntry, EntryCategory, MenuItemModel};

    fn model_of(names: &[&str]) -> MenuModel {
        let mut items = vec![MenuItemModel::title("Tray-Folder")];
        for name in names {
            let entry = DirectoryEntry {
                name: name.to_string(),
                path: PathBuf::from(format!("/f/{}", name)),
                is_shortcut: false,
            };
            items.push(MenuItemModel::entry(&entry, EntryCategory::PlainFile));
        }
        items.push(MenuItemModel::quit());
        MenuModel { items }
    }

    fn model_with(entries: usize) -> MenuModel {
        let names: Vec<String> = (0..entries).map(|i| format!("item{}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        model_of(&names)
    }

    #[test]
    fn ids_round_trip_through_parse() {
        let model = model_with(2);
        assert_eq!(item_menu_id(&model, 7, 0), "title");
        assert_eq!(item_menu_id(&model, 7, 1), "entry_7_1");
        assert_eq!(item_menu_id(&model, 7, 3), "quit");
        assert_eq!(
            parse_menu_action("entry_7_1"),
            Some(MenuAction::Activate {
                generation: 7,
                index: 1
            })
        );
        assert_eq!(parse_menu_action("quit"), Some(MenuAction::Quit));
    }

    #[test]
    fn title_and_junk_ids_do_nothing() {
        assert_eq!(parse_menu_action("title"), None);
        assert_eq!(parse_menu_action("entry_"), None);
        assert_eq!(parse_menu_action("entry_1"), None);
        assert_eq!(parse_menu_action("entry_x_1"), None);
        assert_eq!(parse_menu_action("refresh"), None);
    }

    #[test]
    fn click_on_an_older_menu_opens_its_own_entry() {
        let mut menus = RenderedMenus::new();
        let (shown, _) = menus.insert(model_of(&["a", "b"]));
        // Folder changed and the menu was rebuilt before the click arrived
        let (rebuilt, _) = menus.insert(model_of(&["a", "c", "d"]));
        assert_ne!(shown, rebuilt);

        let shown_model = menus.get(shown).unwrap();
        let clicked = parse_menu_action(&item_menu_id(shown_model, shown, 2)).unwrap();
        assert_eq!(
            menus.activation(&clicked),
            Some(MenuActivation::Open(PathBuf::from("/f/b")))
        );

        let rebuilt_model = menus.get(rebuilt).unwrap();
        let clicked = parse_menu_action(&item_menu_id(rebuilt_model, rebuilt, 2)).unwrap();
        assert_eq!(
            menus.activation(&clicked),
            Some(MenuActivation::Open(PathBuf::from("/f/c")))
        );
    }

    #[test]
    fn forgotten_menus_resolve_to_nothing() {
        let mut menus = RenderedMenus::new();
        let (first, _) = menus.insert(model_of(&["a"]));
        for _ in 0..KEPT_MENUS {
            menus.insert(model_of(&["b"]));
        }
        assert!(menus.get(first).is_none());
        let stale = MenuAction::Activate {
            generation: first,
            index: 1,
        };
        assert_eq!(menus.activation(&stale), None);
        assert_eq!(menus.activation(&MenuAction::Quit), Some(MenuActivation::Quit));
    }

    #[test]
    fn huge_metrics_saturate() {
        let metrics = MenuMetrics {
            item_height: u32::MAX / 2,
            separator_height: u32::MAX,
            padding: u32::MAX,
        };
        assert_eq!(estimate_menu_height(&model_with(3), &metrics), u32::MAX);
    }

    #[test]
    fn height_counts_items_separators_and_padding() {
        let metrics = MenuMetrics {
            item_height: 20,
            separator_height: 5,
            padding: 4,
        };
        // title + 3 entries + quit = 5 rows, 2 separators, padding twice
        assert_eq!(estimate_menu_height(&model_with(3), &metrics), 5 * 20 + 2 * 5 + 2 * 4);
        assert_eq!(estimate_menu_height(&MenuModel::default(), &metrics), 8);
    }

    #[test]
    fn popup_sits_above_the_icon() {
        let icon = IconGeometry {
            x: 1800.0,
            y: 1040.0,
            width: 24.0,
            height: 24.0,
        };
        let position = popup_position(&icon, 240);
        assert_eq!(position, MenuPosition { x: 1800.0, y: 800.0 });
    }

    #[test]
    fn tooltip_lines() {
        let tooltip = build_tooltip("Tray-Folder", Path::new("/links"), Some(3), None);
        assert_eq!(tooltip, "Tray-Folder\n/links\n3 items");

        let tooltip = build_tooltip("Tray-Folder", Path::new("/links"), None, Some("gone"));
        assert_eq!(tooltip, "Tray-Folder\n/links\n⛔ gone");
    }
}
