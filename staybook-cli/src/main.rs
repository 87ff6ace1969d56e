//! Staybook CLI - Command-line interface for the Staybook booking service
//!
//! Keeps the session token on disk between runs and exposes the hotel, room,
//! booking, photo and user operations of the backend.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use staybook_api::{ApiClient, FileTokenStore};
use staybook_core::{
    init_logging, Booking, BookingDraft, ClientConfig, Credentials, ErrorContext, Hotel,
    HotelDraft, HotelSearch, Id, LoggingConfig, PasswordChange, Photo, ProfileUpdate,
    Registration, Role, Room, RoomDraft, StaybookError, StaybookResult, UploadFile, User,
    UserDraft, UserPatch, DEFAULT_CONFIG_FILE,
};
use staybook_session::{GuardDecision, RouteGuard, SessionManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "staybook")]
#[command(about = "Command-line client for the Staybook hotel booking service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding configuration
    #[arg(long)]
    api_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        login: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in with it
    Register {
        login: String,

        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage your own account
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Browse and manage hotels
    Hotels {
        #[command(subcommand)]
        command: HotelCommand,
    },

    /// Browse and manage rooms
    Rooms {
        #[command(subcommand)]
        command: RoomCommand,
    },

    /// Make and manage bookings
    Bookings {
        #[command(subcommand)]
        command: BookingCommand,
    },

    /// Upload and manage photos
    Photos {
        #[command(subcommand)]
        command: PhotoCommand,
    },

    /// Administer user accounts (admin only)
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Change login or email
    Update {
        #[arg(long)]
        login: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Change password
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Args)]
struct HotelFields {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    address: Option<String>,

    /// Free-form description
    #[arg(long)]
    describe: Option<String>,

    #[arg(long)]
    rate: Option<f64>,
}

impl From<HotelFields> for HotelDraft {
    fn from(fields: HotelFields) -> Self {
        HotelDraft {
            name: fields.name,
            city: fields.city,
            address: fields.address,
            describe: fields.describe,
            rate: fields.rate,
        }
    }
}

#[derive(Subcommand)]
enum HotelCommand {
    /// List all hotels
    List,

    /// Show one hotel
    Show { id: Id },

    /// Hotels you own or manage
    Mine,

    /// Hotels belonging to an owner
    Owner { owner_id: Id },

    /// Search hotels by city, dates and guests
    Search {
        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        check_in: Option<NaiveDate>,

        #[arg(long)]
        check_out: Option<NaiveDate>,

        #[arg(long)]
        guests: Option<u32>,
    },

    /// Popular destinations
    Destinations,

    /// Add a hotel
    Create {
        #[command(flatten)]
        fields: HotelFields,
    },

    /// Change a hotel
    Update {
        id: Id,

        #[command(flatten)]
        fields: HotelFields,
    },

    /// Remove a hotel
    Delete { id: Id },
}

#[derive(Subcommand)]
enum RoomCommand {
    /// List rooms, optionally for one hotel
    List {
        #[arg(long)]
        hotel: Option<Id>,
    },

    /// Show one room
    Show { id: Id },

    /// Add a room to a hotel
    Create {
        #[arg(long)]
        hotel: Id,

        #[arg(long)]
        number: i64,

        #[arg(long = "type")]
        room_type: Option<String>,

        #[arg(long)]
        capacity: Option<u32>,

        #[arg(long)]
        price: Option<f64>,
    },

    /// Remove a room
    Delete { id: Id },
}

#[derive(Subcommand)]
enum BookingCommand {
    /// Your bookings
    Mine,

    /// Bookings for a room
    Room { room_id: Id },

    /// Bookings made by a user
    User { user_id: Id },

    /// Book a room
    Book {
        room: Id,

        check_in: NaiveDate,

        check_out: NaiveDate,

        #[arg(long)]
        amount: Option<f64>,
    },

    /// Cancel a booking
    Cancel { id: Id },

    /// Delete a booking record
    Delete { id: Id },
}

#[derive(Subcommand)]
enum PhotoCommand {
    /// Upload a photo for a hotel, a room, or your profile
    Upload {
        path: PathBuf,

        #[arg(long, conflicts_with = "room")]
        hotel: Option<Id>,

        #[arg(long)]
        room: Option<Id>,
    },

    /// List photos of a hotel or a room
    List {
        #[arg(long, conflicts_with = "room", required_unless_present = "room")]
        hotel: Option<Id>,

        #[arg(long)]
        room: Option<Id>,
    },

    /// Remove a photo
    Delete { id: Id },
}

#[derive(Subcommand)]
enum UserCommand {
    /// List all users
    List,

    /// Show one user
    Show { id: Id },

    /// Change a user's role
    SetRole { id: Id, role: Role },

    /// Remove a user
    Delete { id: Id },
}

/// Everything a command needs to talk to the backend
struct App {
    client: Arc<ApiClient>,
    session: SessionManager,
}

impl App {
    fn connect(config: &ClientConfig) -> StaybookResult<Self> {
        let token_path = config.token_file_path()?;
        debug!("Using token file {}", token_path.display());

        let store = Arc::new(FileTokenStore::open(&token_path, &config.token_storage_key)?);
        let client = Arc::new(ApiClient::new(config, store)?);
        let session = SessionManager::new(client.clone());

        Ok(Self { client, session })
    }

    /// Resolve the stored session and apply `guard` to it
    async fn require(&self, guard: RouteGuard) -> StaybookResult<()> {
        self.session.start().await;

        match guard.check(&self.session) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Redirect { .. } => Err(StaybookError::Permission {
                message: "Not logged in. Run `staybook login` first.".to_string(),
            }),
            decision => Err(StaybookError::Permission {
                message: decision
                    .message()
                    .unwrap_or_else(|| "Access denied".to_string()),
            }),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        e.log();
        report(&e);
        std::process::exit(1);
    }
}

async fn run() -> StaybookResult<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };

    init_logging(&logging_config).map_err(|e| StaybookError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check the RUST_LOG environment variable"),
    })?;

    info!("Starting Staybook CLI v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
        config.validate()?;
    }

    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        return handle_config(&config, cli.config.as_deref(), show, init, validate);
    }

    let app = App::connect(&config)?;

    match cli.command {
        Commands::Login { login, password } => {
            let user = app.session.login(&Credentials { login, password }).await?;
            println!("Logged in as {} ({})", user.login, user.role);
        }
        Commands::Register {
            login,
            email,
            password,
        } => {
            let user = app
                .session
                .register(&Registration {
                    login,
                    email,
                    password,
                })
                .await?;
            println!("Welcome, {}! Your account is ready.", user.login);
        }
        Commands::Logout => {
            app.session.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            let state = app.session.start().await;
            match state.user() {
                Some(user) => print_user(user),
                None => println!("Not logged in"),
            }
        }
        Commands::Profile { command } => handle_profile(&app, command).await?,
        Commands::Hotels { command } => handle_hotels(&app, command).await?,
        Commands::Rooms { command } => handle_rooms(&app, command).await?,
        Commands::Bookings { command } => handle_bookings(&app, command).await?,
        Commands::Photos { command } => handle_photos(&app, command).await?,
        Commands::Users { command } => handle_users(&app, command).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> StaybookResult<ClientConfig> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ClientConfig::load_from(path, true)
        }
        None => ClientConfig::load(),
    }
}

fn handle_config(
    config: &ClientConfig,
    config_path: Option<&Path>,
    show: bool,
    init: bool,
    validate: bool,
) -> StaybookResult<()> {
    if init {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if path.exists() {
            return Err(StaybookError::Config {
                message: format!("{} already exists", path.display()),
                source: None,
                context: ErrorContext::new("config_init")
                    .with_suggestion("Edit the existing file or remove it first"),
            });
        }
        std::fs::write(path, ClientConfig::default().to_toml()?)?;
        println!("Configuration initialized at: {}", path.display());
    }

    if validate {
        config.validate()?;
        println!("Configuration is valid");
    }

    if show || !(init || validate) {
        println!("{}", config.to_toml()?);
        println!("# token file: {}", config.token_file_path()?.display());
    }

    Ok(())
}

async fn handle_profile(app: &App, command: ProfileCommand) -> StaybookResult<()> {
    app.require(RouteGuard::authenticated()).await?;

    match command {
        ProfileCommand::Update { login, email } => {
            let update = ProfileUpdate { login, email };
            let saved = app.client.auth().update_profile(&update).await?;
            if !app.session.update_user(saved_profile_patch(&update, saved.as_ref())) {
                warn!("Profile saved but the session no longer holds a signed-in user");
            }
            println!("Profile saved");
            if let Some(user) = &saved {
                print_user(user);
            }
        }
        ProfileCommand::Password { current, new } => {
            app.client
                .auth()
                .change_password(&PasswordChange {
                    current_password: current,
                    new_password: new,
                })
                .await?;
            println!("Password changed");
        }
    }

    Ok(())
}

/// Fields to merge into the session after a profile save; the submitted
/// values stand in when the backend does not echo the user
fn saved_profile_patch(update: &ProfileUpdate, saved: Option<&User>) -> UserPatch {
    match saved {
        Some(user) => UserPatch::from(user),
        None => UserPatch {
            login: update.login.clone(),
            email: update.email.clone(),
            ..Default::default()
        },
    }
}

async fn handle_hotels(app: &App, command: HotelCommand) -> StaybookResult<()> {
    let hotels = app.client.hotels();

    match command {
        HotelCommand::List => print_hotels(&hotels.list().await?),
        HotelCommand::Show { id } => print_hotel(&hotels.get(id).await?),
        HotelCommand::Mine => {
            app.require(RouteGuard::my_hotels()).await?;
            print_hotels(&hotels.mine().await?);
        }
        HotelCommand::Owner { owner_id } => print_hotels(&hotels.by_owner(owner_id).await?),
        HotelCommand::Search {
            city,
            check_in,
            check_out,
            guests,
        } => {
            let search = HotelSearch {
                city,
                check_in,
                check_out,
                guests,
            };
            print_hotels(&hotels.search(&search).await?);
        }
        HotelCommand::Destinations => {
            for destination in hotels.popular_destinations().await? {
                println!("{}", serde_json::to_string(&destination)?);
            }
        }
        HotelCommand::Create { fields } => {
            app.require(RouteGuard::manage_hotel()).await?;
            match hotels.create(&fields.into()).await? {
                Some(created) => println!("Created hotel #{}", created.id),
                None => println!("Hotel created"),
            }
        }
        HotelCommand::Update { id, fields } => {
            app.require(RouteGuard::manage_hotel()).await?;
            match hotels.update(id, &fields.into()).await? {
                Some(updated) => print_hotel(&updated),
                None => println!("Updated hotel #{}", id),
            }
        }
        HotelCommand::Delete { id } => {
            app.require(RouteGuard::manage_hotel()).await?;
            hotels.delete(id).await?;
            println!("Deleted hotel #{}", id);
        }
    }

    Ok(())
}

async fn handle_rooms(app: &App, command: RoomCommand) -> StaybookResult<()> {
    let rooms = app.client.rooms();

    match command {
        RoomCommand::List { hotel } => {
            let list = match hotel {
                Some(hotel_id) => rooms.by_hotel(hotel_id).await?,
                None => rooms.list().await?,
            };
            list.iter().for_each(print_room);
        }
        RoomCommand::Show { id } => print_room(&rooms.get(id).await?),
        RoomCommand::Create {
            hotel,
            number,
            room_type,
            capacity,
            price,
        } => {
            app.require(RouteGuard::manage_hotel()).await?;
            let draft = RoomDraft {
                hotel_id: Some(hotel),
                number: Some(number),
                room_type,
                capacity,
                price,
                is_free: Some(true),
            };
            match rooms.create(&draft).await? {
                Some(created) => {
                    println!("Created room #{} in hotel #{}", created.id, created.hotel_id)
                }
                None => println!("Created room {} in hotel #{}", number, hotel),
            }
        }
        RoomCommand::Delete { id } => {
            app.require(RouteGuard::manage_hotel()).await?;
            rooms.delete(id).await?;
            println!("Deleted room #{}", id);
        }
    }

    Ok(())
}

async fn handle_bookings(app: &App, command: BookingCommand) -> StaybookResult<()> {
    let bookings = app.client.bookings();

    match command {
        BookingCommand::Mine => {
            app.require(RouteGuard::authenticated()).await?;
            bookings.mine().await?.iter().for_each(print_booking);
        }
        BookingCommand::Room { room_id } => {
            app.require(RouteGuard::manage_hotel()).await?;
            bookings.by_room(room_id).await?.iter().for_each(print_booking);
        }
        BookingCommand::User { user_id } => {
            app.require(RouteGuard::admin_panel()).await?;
            bookings.by_user(user_id).await?.iter().for_each(print_booking);
        }
        BookingCommand::Book {
            room,
            check_in,
            check_out,
            amount,
        } => {
            app.require(RouteGuard::authenticated()).await?;
            let mut draft = BookingDraft::new(room, check_in, check_out);
            if draft.nights().is_none() {
                return Err(StaybookError::Config {
                    message: "Check-out must be after check-in".to_string(),
                    source: None,
                    context: ErrorContext::new("booking").with_operation("book"),
                });
            }
            draft.amount = amount;
            match bookings.create(&draft).await? {
                Some(created) => {
                    println!("Booked: #{}", created.id);
                    print_booking(&created);
                }
                None => println!("Booked room #{}", room),
            }
        }
        BookingCommand::Cancel { id } => {
            app.require(RouteGuard::authenticated()).await?;
            match bookings.cancel(id).await? {
                Some(cancelled) => print_booking(&cancelled),
                None => println!("Cancelled booking #{}", id),
            }
        }
        BookingCommand::Delete { id } => {
            app.require(RouteGuard::manage_hotel()).await?;
            bookings.delete(id).await?;
            println!("Deleted booking #{}", id);
        }
    }

    Ok(())
}

async fn handle_photos(app: &App, command: PhotoCommand) -> StaybookResult<()> {
    let photos = app.client.photos();

    match command {
        PhotoCommand::Upload { path, hotel, room } => {
            let file = read_upload(&path).await?;
            let photo = match (hotel, room) {
                (Some(hotel_id), _) => {
                    app.require(RouteGuard::manage_hotel()).await?;
                    photos.upload_hotel(hotel_id, file).await?
                }
                (None, Some(room_id)) => {
                    app.require(RouteGuard::manage_hotel()).await?;
                    photos.upload_room(room_id, file).await?
                }
                (None, None) => {
                    app.require(RouteGuard::authenticated()).await?;
                    let photo = photos.upload_user(file).await?;
                    if let Some(photo) = &photo {
                        app.session.update_user(UserPatch {
                            photo_id: Some(photo.id),
                            ..Default::default()
                        });
                    }
                    photo
                }
            };
            match photo {
                Some(photo) => print_photo(&photo),
                None => println!("Photo uploaded"),
            }
        }
        PhotoCommand::List { hotel, room } => {
            let list = match (hotel, room) {
                (Some(hotel_id), _) => photos.for_hotel(hotel_id).await?,
                (None, Some(room_id)) => photos.for_room(room_id).await?,
                (None, None) => Vec::new(),
            };
            list.iter().for_each(print_photo);
        }
        PhotoCommand::Delete { id } => {
            app.require(RouteGuard::authenticated()).await?;
            photos.delete(id).await?;
            println!("Deleted photo #{}", id);
        }
    }

    Ok(())
}

async fn handle_users(app: &App, command: UserCommand) -> StaybookResult<()> {
    app.require(RouteGuard::admin_panel()).await?;
    let users = app.client.users();

    match command {
        UserCommand::List => users.list().await?.iter().for_each(print_user),
        UserCommand::Show { id } => print_user(&users.get(id).await?),
        UserCommand::SetRole { id, role } => {
            let draft = UserDraft {
                role: Some(role),
                ..Default::default()
            };
            match users.update(id, &draft).await? {
                Some(updated) => print_user(&updated),
                None => println!("Updated user #{}", id),
            }
        }
        UserCommand::Delete { id } => {
            users.delete(id).await?;
            println!("Deleted user #{}", id);
        }
    }

    Ok(())
}

async fn read_upload(path: &Path) -> StaybookResult<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mime_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    Ok(UploadFile::new(file_name, bytes).with_mime_type(mime_type))
}

/// Print an error the way a terminal user needs to see it
fn report(error: &StaybookError) {
    match error {
        StaybookError::Api(api_error) => {
            eprintln!("Error: {}", api_error.message());
            for field_error in api_error.field_errors() {
                eprintln!("  - {}", field_error);
            }
        }
        other => {
            eprintln!("Error: {}", other);
            if let Some(context) = other.context() {
                for suggestion in &context.recovery_suggestions {
                    eprintln!("  hint: {}", suggestion);
                }
            }
        }
    }
}

fn print_user(user: &User) {
    println!(
        "#{} {} <{}> [{}]",
        user.id,
        user.login,
        user.email.as_deref().unwrap_or("no email"),
        user.role
    );
}

fn print_hotels(hotels: &[Hotel]) {
    if hotels.is_empty() {
        println!("No hotels found");
    }
    hotels.iter().for_each(print_hotel);
}

fn print_hotel(hotel: &Hotel) {
    let rate = hotel
        .rate
        .map(|rate| format!("{:.1}", rate))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{} {} ({}) rating {}",
        hotel.id,
        hotel.name,
        hotel.city.as_deref().unwrap_or("unknown city"),
        rate
    );
    if let Some(address) = &hotel.address {
        println!("    {}", address);
    }
}

fn print_room(room: &Room) {
    println!(
        "#{} room {} [{}] sleeps {} at {} - {}",
        room.id,
        room.number,
        room.room_type.as_deref().unwrap_or("standard"),
        room.capacity.map_or_else(|| "?".to_string(), |c| c.to_string()),
        room.price.map_or_else(|| "?".to_string(), |p| format!("{:.2}", p)),
        if room.is_free { "free" } else { "occupied" }
    );
}

fn print_booking(booking: &Booking) {
    println!(
        "#{} room {} {} -> {} [{}]{}",
        booking.id,
        booking.room_id,
        booking.date_in_room,
        booking.date_out_room,
        booking.status,
        if booking.is_paid { " paid" } else { "" }
    );
}

fn print_photo(photo: &Photo) {
    println!("#{} {}", photo.id, photo.url);
}
