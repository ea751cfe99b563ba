use std::path::{Path, PathBuf};

use quechat_analytics::DataPaths;
use tempfile::TempDir;

pub const CATEGORIES_CSV: &str = "\
category_id,category_name
1,Tacos
2,Drinks
3,Desserts
";

pub const MENU_CSV: &str = "\
item_id,item_name,description,price,category_id,is_vegetarian,is_spicy,is_gluten_free
10,Carnitas Taco,Slow-cooked pork,5.00,1,false,false,true
11,Veggie Taco,Grilled peppers,4.50,1,true,true,TRUE
20,Horchata,Rice drink,3.00,2,true,false,
30,Churros,With chocolate,6.00,3,yes,no,no
";

pub const ORDERS_CSV: &str = "\
order_id,item_id,customer_id,quantity,special_request,subtotal,payment_method,order_status,order_placed
1,10,100,2,,10.00,Credit Card,Completed,2024-01-05 12:30:00
1,20,100,1,no ice,3.00,Credit Card,Completed,2024-01-05 12:30:00
2,11,101,1,,4.50,Cash,Cancelled,2024-01-20 19:05:00
3,30,100,1,,6.00,Credit Card,In Progress,2024-02-02 19:45:00
4,10,102,3,extra salsa,15.00,Debit Card,Completed,2024-12-31 23:10:00
5,99,100,1,,0.00,Cash,Completed,2025-01-01 00:15:00
";

pub const FEEDBACK_CSV: &str = "\
Customer_ID,Item_ID,Feedback_Text,Rating,Feedback_Category,Submission_Timestamp
100,10,Best taco in town,5.0,Food Quality,2024-01-06 10:00:00
101,11,Took forever,1.0,Service,2024-01-21 09:00:00
102,10,Loved it,5.0,Food Quality,2025-01-01 12:00:00
100,30,Nice place,5.0,Ambiance,2024-02-03 08:00:00
101,20,Too sweet,1.5,Service,2024-01-22 09:00:00
";

/// Four CSV sources written into a temporary directory.
#[allow(dead_code)]
pub struct SampleData {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl SampleData {
    /// The standard fixture set.
    pub fn new() -> Self {
        Self::with(CATEGORIES_CSV, MENU_CSV, ORDERS_CSV, FEEDBACK_CSV)
    }

    pub fn with(categories: &str, menu: &str, orders: &str, feedback: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let data = Self { dir };
        data.write("categories.csv", categories);
        data.write("menu.csv", menu);
        data.write("order_data.csv", orders);
        data.write("feedback_data.csv", feedback);
        data
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("remove fixture");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::in_dir(self.dir.path())
    }
}

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
