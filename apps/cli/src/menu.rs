//! # Menu Loop
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shell::run                                     │
//! │                                                                         │
//! │   ┌──► print menu ──► read 1..8 ──► dispatch ──┐                        │
//! │   └────────────────────────────────────────────┘                        │
//! │                            │                                            │
//! │       8, end of input or a terminal error                               │
//! │                            ▼                                            │
//! │                   SheetStore::save ──► return                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain errors (unknown code, not enough stock) are printed and the loop
//! continues. Only terminal and file failures end it early, and the session
//! is still saved before a terminal failure is returned.

use std::io::{BufRead, Write};

use tally_core::validation::{validate_code, validate_product_name, validate_search_query};
use tally_core::{Inventory, Percent, Product, ProductUpdate, ReportFilter, SaleLine};
use tally_sheet::SheetStore;
use tracing::{debug, error, info};

use crate::error::{ShellError, ShellResult};
use crate::prompt::{
    parse_date, parse_percent, parse_price, parse_sale_quantity, parse_stock, Prompter,
};
use crate::render;

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddProduct,
    RemoveProduct,
    EditProduct,
    Search,
    Display,
    Sell,
    Report,
    SaveAndExit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 8] = [
        MenuChoice::AddProduct,
        MenuChoice::RemoveProduct,
        MenuChoice::EditProduct,
        MenuChoice::Search,
        MenuChoice::Display,
        MenuChoice::Sell,
        MenuChoice::Report,
        MenuChoice::SaveAndExit,
    ];

    /// Maps the 1-based number shown in the menu.
    pub fn from_number(n: u32) -> Option<Self> {
        let idx = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::AddProduct => "Add a product",
            MenuChoice::RemoveProduct => "Remove a product",
            MenuChoice::EditProduct => "Edit a product",
            MenuChoice::Search => "Search products",
            MenuChoice::Display => "Show inventory",
            MenuChoice::Sell => "Sell products",
            MenuChoice::Report => "Sales report",
            MenuChoice::SaveAndExit => "Save and exit",
        }
    }
}

pub struct Shell<R, W> {
    prompter: Prompter<R, W>,
    inventory: Inventory,
    store: SheetStore,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(inventory: Inventory, store: SheetStore, input: R, output: W) -> Self {
        Shell {
            prompter: Prompter::new(input, output),
            inventory,
            store,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn output(&self) -> &W {
        self.prompter.output()
    }

    /// Runs the menu until "save and exit" or end of input, then saves.
    ///
    /// Any other error still saves first and is then returned.
    pub fn run(&mut self) -> ShellResult<()> {
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(ShellError::EndOfInput) => {
                    info!("Input closed");
                    self.prompter.say("")?;
                    break;
                }
                Err(err) => {
                    error!(error = %err, "Menu loop failed, saving before exit");
                    if let Err(save_err) = self.store.save(&self.inventory) {
                        error!(error = %save_err, "Save after failure did not complete");
                    }
                    return Err(err);
                }
            }
        }
        self.save()
    }

    /// One menu round. Returns `false` when the user chose to exit.
    fn step(&mut self) -> ShellResult<bool> {
        self.prompter.say("\nCommands:")?;
        for (n, choice) in MenuChoice::ALL.iter().enumerate() {
            self.prompter.say(format_args!("{}. {}", n + 1, choice.label()))?;
        }

        let number = self
            .prompter
            .ask_parsed("Enter command number: ", |s| s.parse::<u32>())?;

        let Some(choice) = number.and_then(MenuChoice::from_number) else {
            self.prompter.say("Unknown command. Please enter a number from the menu.")?;
            return Ok(true);
        };

        debug!(?choice, "Menu choice");
        match choice {
            MenuChoice::AddProduct => self.add_product()?,
            MenuChoice::RemoveProduct => self.remove_product()?,
            MenuChoice::EditProduct => self.edit_product()?,
            MenuChoice::Search => self.search()?,
            MenuChoice::Display => self.prompter.say(render::catalog(self.inventory.products()))?,
            MenuChoice::Sell => self.sell()?,
            MenuChoice::Report => self.report()?,
            MenuChoice::SaveAndExit => return Ok(false),
        }
        Ok(true)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    fn add_product(&mut self) -> ShellResult<()> {
        let code = self.prompter.require("Product code: ", validate_code)?;
        let name = self.prompter.require("Product name: ", validate_product_name)?;
        let price = self.prompter.require("Price: ", parse_price)?;
        let quantity = self.prompter.require("Quantity in stock: ", parse_stock)?;

        let product = self.inventory.add_product(Product::new(code, name, price, quantity));
        self.prompter.say(format_args!("Product '{}' added.", product.name))
    }

    /// Reads a code to look up. The exact line is tried first so codes
    /// loaded from a file with padding or past the length limit still match.
    fn ask_existing_code(&mut self, prompt: &str) -> ShellResult<String> {
        loop {
            let raw = self.prompter.ask_raw(prompt)?;
            if raw.trim().is_empty() {
                self.prompter.say("A value is required.")?;
                continue;
            }
            if self.inventory.product(&raw).is_none() {
                return Ok(raw.trim().to_string());
            }
            return Ok(raw);
        }
    }

    fn remove_product(&mut self) -> ShellResult<()> {
        let code = self.ask_existing_code("Code of the product to remove: ")?;

        match self.inventory.remove_product(&code) {
            Ok(removed) => self.prompter.say(format_args!("Product {} removed.", removed.code)),
            Err(err) => self.prompter.say(err),
        }
    }

    /// Empty answers keep the current value.
    fn edit_product(&mut self) -> ShellResult<()> {
        let code = self.ask_existing_code("Code of the product to edit: ")?;
        let Some(current) = self.inventory.product(&code).cloned() else {
            return self.prompter.say(format_args!("Product not found: {code}"));
        };

        let name = self
            .prompter
            .ask_parsed(&format!("New name [{}]: ", current.name), validate_product_name)?
            .unwrap_or(current.name);
        let price = self
            .prompter
            .ask_parsed(&format!("New price [{}]: ", current.price), parse_price)?
            .unwrap_or(current.price);
        let quantity = self
            .prompter
            .ask_parsed(&format!("New quantity [{}]: ", current.quantity), parse_stock)?
            .unwrap_or(current.quantity);

        let update = ProductUpdate {
            name,
            price,
            quantity,
        };
        match self.inventory.edit_product(&code, update) {
            Ok(product) => self.prompter.say(format_args!("Product {} updated.", product.code)),
            Err(err) => self.prompter.say(err),
        }
    }

    fn search(&mut self) -> ShellResult<()> {
        let keyword = self
            .prompter
            .ask_parsed("Search by product name: ", validate_search_query)?
            .unwrap_or_default();

        let hits = self.inventory.search_products(&keyword);
        self.prompter.say(render::search_results(&keyword, &hits))
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Builds a cart line by line, then runs it through `make_sale`.
    ///
    /// Lines are checked against stock as they are entered, counting what is
    /// already in the cart; `make_sale` checks the whole cart again.
    fn sell(&mut self) -> ShellResult<()> {
        let mut lines: Vec<SaleLine> = Vec::new();

        loop {
            let code = match self.prompter.ask("Product code ('0' to finish): ")? {
                Some(code) if code != "0" => code,
                _ => break,
            };
            let quantity = self.prompter.require("Quantity: ", parse_sale_quantity)?;

            let in_cart: u64 = lines
                .iter()
                .filter(|line| line.code == code)
                .map(|line| u64::from(line.quantity))
                .sum();

            match self.inventory.product(&code) {
                Some(product) if product.can_sell(in_cart + u64::from(quantity)) => {
                    lines.push(SaleLine::from_product(product, quantity));
                }
                _ => self.prompter.say("Product not found or not enough in stock.")?,
            }
        }

        if lines.is_empty() {
            return self.prompter.say("Nothing to sell.");
        }

        let payment_method = self
            .prompter
            .ask("Payment method (cash/card): ")?
            .unwrap_or_default();
        let discount: Percent = self
            .prompter
            .ask_parsed("Discount, %: ", parse_percent)?
            .unwrap_or_default();
        let tax_rate: Percent = self
            .prompter
            .ask_parsed("Tax, %: ", parse_percent)?
            .unwrap_or_default();

        match self.inventory.make_sale(lines, payment_method, discount, tax_rate) {
            Ok(sale) => self.prompter.say(render::receipt(sale)),
            Err(err) => self.prompter.say(format_args!("Sale rejected: {err}")),
        }
    }

    fn report(&mut self) -> ShellResult<()> {
        let start_date = self
            .prompter
            .ask_parsed("Start date (YYYY-MM-DD, empty for none): ", parse_date)?;
        let end_date = self
            .prompter
            .ask_parsed("End date (YYYY-MM-DD, empty for none): ", parse_date)?;
        let product_code = self
            .prompter
            .ask("Product code to filter by (empty for all): ")?;

        let filter = ReportFilter {
            start_date,
            end_date,
            product_code,
        };
        let report = self.inventory.generate_report(&filter);
        self.prompter.say(render::report(&report))
    }

    fn save(&mut self) -> ShellResult<()> {
        self.store.save(&self.inventory)?;
        self.prompter
            .say(format_args!("Data saved to {}", self.store.path().display()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Cursor, Read};
    use tally_core::Money;
    use tally_sheet::SheetConfig;

    type TestShell = Shell<Cursor<Vec<u8>>, Vec<u8>>;

    fn shell(dir: &tempfile::TempDir, inventory: Inventory, script: &str) -> TestShell {
        let store = SheetStore::new(SheetConfig::new(dir.path().join("inventory_data.xlsx")));
        Shell::new(inventory, store, Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn printed(shell: &TestShell) -> String {
        String::from_utf8(shell.output().clone()).unwrap()
    }

    fn stocked() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.add_product(Product::new("A", "Apple", Money::from_cents(1000), 5));
        inventory
    }

    #[test]
    fn test_menu_numbers() {
        assert_eq!(MenuChoice::from_number(1), Some(MenuChoice::AddProduct));
        assert_eq!(MenuChoice::from_number(8), Some(MenuChoice::SaveAndExit));
        assert_eq!(MenuChoice::from_number(0), None);
        assert_eq!(MenuChoice::from_number(9), None);
    }

    #[test]
    fn test_add_sell_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let script = "1\nA\nApple\n10\n5\n6\nA\n2\n0\ncash\n\n10\n8\n";
        let mut shell = shell(&dir, Inventory::new(), script);

        shell.run().unwrap();

        let inventory = shell.inventory();
        assert_eq!(inventory.product("A").unwrap().quantity, 3);
        assert_eq!(inventory.sales()[0].total_amount.cents(), 2200);

        let out = printed(&shell);
        assert!(out.contains("Product 'Apple' added."));
        assert!(out.contains("Total: 22.00, Discount: 0%, Tax: 10%, Payment method: cash"));
        assert!(out.contains("Data saved to"));

        let saved = tally_sheet::load(dir.path().join("inventory_data.xlsx")).unwrap();
        assert_eq!(&saved.inventory, inventory);
    }

    #[test]
    fn test_end_of_input_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, Inventory::new(), "1\nB\nBread\n2.5\n4\n");

        shell.run().unwrap();

        let saved = tally_sheet::load(dir.path().join("inventory_data.xlsx")).unwrap();
        assert_eq!(
            saved.inventory.products,
            vec![Product::new("B", "Bread", Money::from_cents(250), 4)]
        );
    }

    #[test]
    fn test_invalid_text_line_is_asked_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = b"1\nA\nApple\n10\n5\n".to_vec();
        script.extend_from_slice(b"\xff\xfe\n8\n");
        let store = SheetStore::new(SheetConfig::new(dir.path().join("inventory_data.xlsx")));
        let mut shell = Shell::new(Inventory::new(), store, Cursor::new(script), Vec::new());

        shell.run().unwrap();

        assert!(printed(&shell).contains("Invalid input: not valid text."));
        let saved = tally_sheet::load(dir.path().join("inventory_data.xlsx")).unwrap();
        assert_eq!(saved.inventory.products, vec![Product::new("A", "Apple", Money::from_cents(1000), 5)]);
    }

    /// Stands in for a terminal that breaks mid-session.
    struct BrokenTerminal;

    impl Read for BrokenTerminal {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }
    }

    #[test]
    fn test_terminal_error_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let input = BufReader::new(Cursor::new(b"1\nA\nApple\n10\n5\n".to_vec()).chain(BrokenTerminal));
        let store = SheetStore::new(SheetConfig::new(dir.path().join("inventory_data.xlsx")));
        let mut shell = Shell::new(Inventory::new(), store, input, Vec::new());

        assert!(matches!(shell.run(), Err(ShellError::Io(_))));

        let saved = tally_sheet::load(dir.path().join("inventory_data.xlsx")).unwrap();
        assert_eq!(saved.inventory.products, vec![Product::new("A", "Apple", Money::from_cents(1000), 5)]);
    }

    #[test]
    fn test_malformed_input_is_asked_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, Inventory::new(), "1\nA\nApple\nabc\n10\nmany\n5\n8\n");

        shell.run().unwrap();

        assert_eq!(printed(&shell).matches("Invalid input").count(), 2);
        assert_eq!(shell.inventory().product("A").unwrap().quantity, 5);
    }

    #[test]
    fn test_sell_rejects_lines_at_entry() {
        let dir = tempfile::tempdir().unwrap();
        // Unknown code, then more than in stock once the cart is counted
        let script = "6\nZ\n1\nA\n4\nA\n2\n0\n\n\n\n8\n";
        let mut shell = shell(&dir, stocked(), script);

        shell.run().unwrap();

        let out = printed(&shell);
        assert_eq!(out.matches("Product not found or not enough in stock.").count(), 2);
        assert_eq!(shell.inventory().product("A").unwrap().quantity, 1);
        assert_eq!(shell.inventory().sales()[0].lines.len(), 1);
    }

    #[test]
    fn test_empty_cart_sells_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, stocked(), "6\n0\n8\n");

        shell.run().unwrap();

        assert!(printed(&shell).contains("Nothing to sell."));
        assert!(shell.inventory().sales().is_empty());
    }

    #[test]
    fn test_edit_keeps_skipped_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, stocked(), "3\nA\n\n12.50\n\n8\n");

        shell.run().unwrap();

        assert_eq!(
            shell.inventory().product("A").unwrap(),
            &Product::new("A", "Apple", Money::from_cents(1250), 5)
        );
    }

    #[test]
    fn test_remove_unknown_product() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, stocked(), "2\nZ\n2\nA\n8\n");

        shell.run().unwrap();

        let out = printed(&shell);
        assert!(out.contains("Product not found: Z"));
        assert!(out.contains("Product A removed."));
        assert!(shell.inventory().products().is_empty());
    }

    #[test]
    fn test_huge_price_sale_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = "1\nA\nApple\n92233720368547758\n5\n6\nA\n2\n0\ncash\n\n\n8\n";
        let mut shell = shell(&dir, Inventory::new(), script);

        shell.run().unwrap();

        assert!(printed(&shell).contains("Sale rejected: Sale total is too large"));
        assert_eq!(shell.inventory().product("A").unwrap().quantity, 5);
        assert!(shell.inventory().sales().is_empty());
    }

    #[test]
    fn test_loaded_codes_match_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let long = "L".repeat(60);
        let mut inventory = Inventory::new();
        inventory.add_product(Product::new(long.clone(), "Long", Money::from_cents(100), 1));
        inventory.add_product(Product::new(" P ", "Padded", Money::from_cents(200), 2));
        let script = format!("2\n{long}\n3\n P \nPlum\n\n\n8\n");
        let mut shell = shell(&dir, inventory, &script);

        shell.run().unwrap();

        assert!(printed(&shell).contains(&format!("Product {long} removed.")));
        assert_eq!(
            shell.inventory().products(),
            &[Product::new(" P ", "Plum", Money::from_cents(200), 2)]
        );
    }

    #[test]
    fn test_trimmed_code_still_matches() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir, stocked(), "2\n  A  \n8\n");

        shell.run().unwrap();

        assert!(printed(&shell).contains("Product A removed."));
        assert!(shell.inventory().products().is_empty());
    }

    #[test]
    fn test_search_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let script = "4\napp\n6\nA\n1\n0\ncard\n\n\n7\n\n\nA\n7\n2000-01-01\n2000-01-02\n\n9\n8\n";
        let mut shell = shell(&dir, stocked(), script);

        shell.run().unwrap();

        let out = printed(&shell);
        assert!(out.contains("Search results:\nCode: A, Name: Apple, Price: 10.00, Quantity: 5"));
        assert!(out.contains("Total revenue: 10.00"));
        assert!(out.contains("No sales match the report filters."));
        assert!(out.contains("Unknown command."));
    }
}
