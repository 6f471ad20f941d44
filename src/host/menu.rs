use crate::rom::FileRomSource;
use terminal_menu::{TerminalMenuItem, button, label, menu, mut_menu, run};

/// Spawns a terminal menu with all the programs in the ROM folder. Returns the picked program's
/// name, or `None` if the user backed out of the menu.
pub fn ask_for_program(source: &FileRomSource) -> anyhow::Result<Option<String>> {
    let program_names = source.list()?;

    if program_names.is_empty() {
        anyhow::bail!("No programs found in {}", source.folder().display());
    }

    let mut menu_items: Vec<TerminalMenuItem> = vec![
        label("-----------------------------------------"),
        label("Select a program to run."),
        label("Use 'WASD' or arrow keys to navigate,"),
        label("enter to select, and 'Q' or esc to exit."),
        label("-----------------------------------------"),
    ];
    let number_of_labels = menu_items.len();

    menu_items.extend(program_names.iter().map(|name| button(name.as_str())));

    let pick_program_menu = menu(menu_items);
    run(&pick_program_menu);

    if mut_menu(&pick_program_menu).canceled() {
        return Ok(None);
    }

    let selection_index = mut_menu(&pick_program_menu).selected_item_index() - number_of_labels;
    Ok(program_names.get(selection_index).cloned())
}
